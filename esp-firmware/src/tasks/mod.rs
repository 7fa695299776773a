// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Der Connection-Task schreibt den WiFi-Status, der Status-Worker liest ihn.

pub mod led_demo;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use led_demo::led_demo_task;
pub use wifi::{SharedWifiStatus, connection_task, net_task, status_task};
