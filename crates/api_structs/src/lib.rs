mod event;
mod status;
mod telegram;

pub mod dtos {
    pub use crate::event::dtos::*;
}

pub use crate::event::api::*;
pub use crate::status::api::*;
pub use crate::telegram::api::*;
