pub mod refresh_scheduler;
