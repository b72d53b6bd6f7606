pub mod change_password;
pub mod client;
pub mod forgot_password;
pub mod login;
pub mod register;
pub mod resend_code;
pub mod reset_password;
pub mod session;
pub mod verify_email;
