//! handlers/mod.rs
//! Un handler por modo de entrada del proceso (run, send-test, stop, status, add).

pub mod campaign_handler;
pub mod control_handler;
pub mod test_send_handler;
