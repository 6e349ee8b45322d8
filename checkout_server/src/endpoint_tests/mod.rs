mod checkout;
mod helpers;
mod mocks;
mod notifications;
mod webhook;
