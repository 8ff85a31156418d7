pub mod daily_tap;
pub mod settings;
pub mod tap_record;
pub mod user;

pub use daily_tap::DailyTap;
pub use settings::UserSettings;
pub use tap_record::TapRecord;
pub use user::User;
