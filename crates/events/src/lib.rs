//! Domain events: the facts an aggregate emits when it accepts a command.

pub mod event;

pub use event::Event;
