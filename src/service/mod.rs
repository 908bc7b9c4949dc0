pub mod digest;
pub mod general_invoices;
pub mod mailer;
pub mod mailroom;
pub mod orders;
pub mod statements;
