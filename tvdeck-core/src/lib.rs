pub mod config;
pub mod model;
pub mod navigation;

// Background telemetry and its mailbox
pub mod telemetry;

// Child process supervision
pub mod process;

// Main loop
pub mod scheduler;
