pub(crate) mod commands;
pub(crate) mod input;
pub(crate) mod render;
pub(crate) mod runtime;
pub(crate) mod terminal;
