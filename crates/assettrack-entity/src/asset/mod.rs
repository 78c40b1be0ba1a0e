//! Asset entity, patches, and derived lifecycle state.

pub mod model;
pub mod patch;
pub mod state;

pub use model::{Asset, NewAsset};
pub use patch::{AssetEdit, AssetPatch, PatchValue, RawAssetPatch};
pub use state::{AssetFilter, AssetState};
