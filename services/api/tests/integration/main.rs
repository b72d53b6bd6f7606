mod helpers;
mod login_test;
mod register_test;
mod session_test;
