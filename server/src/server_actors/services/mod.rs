pub mod orders_services;
pub mod otp_service;
