pub mod demo_command;
pub mod epoch_command;
pub mod keygen_command;

pub use self::{demo_command::*, epoch_command::*, keygen_command::*};
