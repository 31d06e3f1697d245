pub mod error;
pub mod event;
pub mod state;
pub mod widget;

pub use error::{DevinfoError, Result};
pub use event::Message;
pub use state::{
    BatteryChanged, BatteryReading, ChargeEstimate, ChargeStatus, CurrentSign, Health, LabeledEntry,
    PlugSource, StatusFields, TelemetrySample,
};
pub use widget::Section;
