pub mod access_assets;
pub mod add_supported_asset;
pub mod deposit;
pub mod detect_and_reallocate;
pub mod emergency_withdraw;
pub mod grant_capabilities;
pub mod initialize;
pub mod register_protocol;
pub mod return_assets;
pub mod revoke_capabilities;
pub mod set_asset_status;
pub mod set_pause;
pub mod set_protocol_status;
pub mod update_config;
pub mod update_protocol_params;
pub mod withdraw;

pub use access_assets::*;
pub use add_supported_asset::*;
pub use deposit::*;
pub use detect_and_reallocate::*;
pub use emergency_withdraw::*;
pub use grant_capabilities::*;
pub use initialize::*;
pub use register_protocol::*;
pub use return_assets::*;
pub use revoke_capabilities::*;
pub use set_asset_status::*;
pub use set_pause::*;
pub use set_protocol_status::*;
pub use update_config::*;
pub use update_protocol_params::*;
pub use withdraw::*;
