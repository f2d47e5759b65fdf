pub mod scripted_provider;
