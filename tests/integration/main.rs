//! End-to-end scenarios exercising every crate together through the public
//! `Orm` facade.

mod scenarios;
