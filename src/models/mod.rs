pub mod audio_settings;
pub mod deleted_photo;
pub mod recycle_bin_state;
pub mod xp;

pub use audio_settings::AudioSettings;
pub use deleted_photo::{
    decode_deleted_photos, encode_deleted_photos, DeletedPhoto, StoredDeletedPhoto,
};
pub use recycle_bin_state::RecycleBinState;
pub use xp::XpConfig;
