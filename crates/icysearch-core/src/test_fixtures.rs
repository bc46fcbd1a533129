//! Shared test models.

use crate::{field::Field, impl_enum_value};
use chrono::{DateTime, Utc};

///
/// User
///

pub(crate) struct User;

impl User {
    pub(crate) const EMAIL: Field<Self, String> = Field::keyword("email");
    pub(crate) const NAME: Field<Self, String> = Field::new("name");
    pub(crate) const AGE: Field<Self, i32> = Field::new("age");
    pub(crate) const ENABLED: Field<Self, Option<bool>> = Field::new("enabled");
    pub(crate) const ACTIVE: Field<Self, bool> = Field::new("active");
    pub(crate) const ADDRESS: Field<Self, Address> = Field::new("address");
}

///
/// Address
///

pub(crate) struct Address;

impl Address {
    pub(crate) const CITY: Field<Self, String> = Field::new("city");
}

///
/// Car
///

pub(crate) struct Car;

impl Car {
    pub(crate) const TIMESTAMP: Field<Self, DateTime<Utc>> = Field::new("timestamp");
    pub(crate) const NAME: Field<Self, String> = Field::new("name");
    pub(crate) const PRICE: Field<Self, u32> = Field::new("price");
    pub(crate) const SOLD: Field<Self, bool> = Field::new("sold");
    pub(crate) const CAR_TYPE: Field<Self, String> = Field::new("carType");
    pub(crate) const KIND: Field<Self, CarKind> = Field::new("kind");
    pub(crate) const EMISSIONS: Field<Self, f64> = Field::new("emissions");
    pub(crate) const ENGINE_SIZE: Field<Self, u32> = Field::new("engineSize");
}

///
/// CarKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum CarKind {
    Sedan,
    Coupe,
}

impl_enum_value!(CarKind { Sedan, Coupe });
