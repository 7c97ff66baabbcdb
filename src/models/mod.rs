//! Typed response bodies, one per upstream operation.

mod finance;
mod geo;
mod validation;
mod web;

pub use finance::{CurrencyConversion, ExchangeRates};
pub use geo::{
    CurrentTime, Holiday, Holidays, IpConnection, IpCurrency, IpFlag, IpGeolocation, IpSecurity,
    IpTimezone, TimezoneConversion, TimezoneQuery,
};
pub use validation::{
    EmailValidation, Flag, PhoneCountry, PhoneFormat, PhoneValidation, VatCompany, VatCountry,
    VatValidation,
};
pub use web::{CompanyInfo, ScrapeResult, Screenshot};
