pub mod calendar_page;
pub mod login_page;
pub mod records_page;
pub mod settings_page;

pub use calendar_page::{CalendarPageState, calendar_page};
pub use login_page::login_page;
pub use records_page::{RecordsPageState, records_page};
pub use settings_page::{SettingsPageState, settings_page};
