//! Shipping form, field validation and the validated shipping address.

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Minimum length of the recipient name, in characters.
const MIN_NAME_CHARS: usize = 2;
/// Minimum number of digits in a phone number.
const MIN_PHONE_DIGITS: usize = 10;
/// Exact number of digits in a postal index number.
const PINCODE_DIGITS: usize = 6;

/// Fields of the shipping form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Address,
    City,
    State,
    Pincode,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::Pincode => "pincode",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name → message for every failing field. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_owned());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

macro_rules! indian_states {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// States and union territories the store ships to.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum IndianState {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl IndianState {
            /// Every state, in form display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Display name, as offered in the form's state selector.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

indian_states! {
    AndamanAndNicobarIslands => "Andaman and Nicobar Islands",
    AndhraPradesh => "Andhra Pradesh",
    ArunachalPradesh => "Arunachal Pradesh",
    Assam => "Assam",
    Bihar => "Bihar",
    Chandigarh => "Chandigarh",
    Chhattisgarh => "Chhattisgarh",
    DadraAndNagarHaveliAndDamanAndDiu => "Dadra and Nagar Haveli and Daman and Diu",
    Delhi => "Delhi",
    Goa => "Goa",
    Gujarat => "Gujarat",
    Haryana => "Haryana",
    HimachalPradesh => "Himachal Pradesh",
    JammuAndKashmir => "Jammu and Kashmir",
    Jharkhand => "Jharkhand",
    Karnataka => "Karnataka",
    Kerala => "Kerala",
    Ladakh => "Ladakh",
    Lakshadweep => "Lakshadweep",
    MadhyaPradesh => "Madhya Pradesh",
    Maharashtra => "Maharashtra",
    Manipur => "Manipur",
    Meghalaya => "Meghalaya",
    Mizoram => "Mizoram",
    Nagaland => "Nagaland",
    Odisha => "Odisha",
    Puducherry => "Puducherry",
    Punjab => "Punjab",
    Rajasthan => "Rajasthan",
    Sikkim => "Sikkim",
    TamilNadu => "Tamil Nadu",
    Telangana => "Telangana",
    Tripura => "Tripura",
    UttarPradesh => "Uttar Pradesh",
    Uttarakhand => "Uttarakhand",
    WestBengal => "West Bengal",
}

impl IndianState {
    /// Look up a state by its display name, ignoring case and surrounding
    /// whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for IndianState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The checkout form as typed by the customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingForm {
    /// Check every field and collect the failures.
    ///
    /// Runs entirely locally, so it is safe to call on every keystroke.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();

        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            errors.insert(Field::Name, "Name must be at least 2 characters");
        }
        if !self.email.contains('@') {
            errors.insert(Field::Email, "Please enter a valid email address");
        }
        if self.phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
            errors.insert(Field::Phone, "Phone number must be at least 10 digits");
        }
        if self.address.trim().is_empty() {
            errors.insert(Field::Address, "Address is required");
        }
        if self.city.trim().is_empty() {
            errors.insert(Field::City, "City is required");
        }
        if self.state.trim().is_empty() {
            errors.insert(Field::State, "State is required");
        } else if IndianState::from_name(&self.state).is_none() {
            errors.insert(Field::State, "Please select a valid state");
        }
        let pincode = self.pincode.trim();
        if pincode.len() != PINCODE_DIGITS || !pincode.bytes().all(|b| b.is_ascii_digit()) {
            errors.insert(Field::Pincode, "Pincode must be exactly 6 digits");
        }

        errors
    }

    /// Validate and convert into a [`ShippingAddress`].
    ///
    /// # Errors
    ///
    /// Returns the field errors if any field fails validation.
    pub fn into_address(self) -> Result<ShippingAddress, FieldErrors> {
        let errors = self.validate();
        let state = match IndianState::from_name(&self.state) {
            Some(state) if errors.is_empty() => state,
            _ => return Err(errors),
        };

        Ok(ShippingAddress {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state,
            pincode: self.pincode.trim().to_owned(),
        })
    }
}

/// A validated shipping address, as stored on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: IndianState,
    pub pincode: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ShippingForm {
        ShippingForm {
            name: "Meera Iyer".to_string(),
            email: "meera@example.in".to_string(),
            phone: "+91 98765 43210".to_string(),
            address: "12 Residency Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560025".to_string(),
        }
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        assert!(valid_form().validate().is_empty());
    }

    #[test]
    fn test_every_field_fails() {
        let form = ShippingForm {
            name: "A".to_string(),
            email: "bad".to_string(),
            phone: "123".to_string(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: "12".to_string(),
        };

        let errors = form.validate();
        assert_eq!(errors.len(), 7);
        assert_eq!(
            errors.get(Field::Name),
            Some("Name must be at least 2 characters")
        );
        assert_eq!(
            errors.get(Field::Email),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            errors.get(Field::Phone),
            Some("Phone number must be at least 10 digits")
        );
        assert_eq!(errors.get(Field::Address), Some("Address is required"));
        assert_eq!(errors.get(Field::City), Some("City is required"));
        assert_eq!(errors.get(Field::State), Some("State is required"));
        assert_eq!(
            errors.get(Field::Pincode),
            Some("Pincode must be exactly 6 digits")
        );
    }

    #[test]
    fn test_pincode_must_be_digits() {
        let form = ShippingForm {
            pincode: "56002A".to_string(),
            ..valid_form()
        };
        assert!(form.validate().contains(Field::Pincode));

        let form = ShippingForm {
            pincode: "5600251".to_string(),
            ..valid_form()
        };
        assert!(form.validate().contains(Field::Pincode));
    }

    #[test]
    fn test_phone_counts_digits_only() {
        let form = ShippingForm {
            phone: "98-76-54-32-1".to_string(),
            ..valid_form()
        };
        assert!(form.validate().contains(Field::Phone));
    }

    #[test]
    fn test_unknown_state() {
        let form = ShippingForm {
            state: "Atlantis".to_string(),
            ..valid_form()
        };
        assert_eq!(
            form.validate().get(Field::State),
            Some("Please select a valid state")
        );
    }

    #[test]
    fn test_state_lookup_ignores_case() {
        assert_eq!(
            IndianState::from_name(" tamil nadu "),
            Some(IndianState::TamilNadu)
        );
        assert_eq!(IndianState::ALL.len(), 36);
    }

    #[test]
    fn test_into_address_trims() {
        let form = ShippingForm {
            name: "  Meera Iyer ".to_string(),
            ..valid_form()
        };
        let address = form.into_address().unwrap();
        assert_eq!(address.name, "Meera Iyer");
        assert_eq!(address.state, IndianState::Karnataka);
    }

    #[test]
    fn test_into_address_returns_errors() {
        let form = ShippingForm {
            city: " ".to_string(),
            ..valid_form()
        };
        let errors = form.into_address().unwrap_err();
        assert!(errors.contains(Field::City));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_state_serializes_as_display_name() {
        let json = serde_json::to_string(&IndianState::WestBengal).unwrap();
        assert_eq!(json, "\"West Bengal\"");
    }
}
