mod delivery;
mod media_flow;

pub use {delivery::Delivery, media_flow::MediaFlow};
