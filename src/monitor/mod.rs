pub mod monitor_loop;
