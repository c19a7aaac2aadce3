//! Typed SOAP actions
//!
//! Every action is a zero-sized marker type implementing [`UpnpAction`],
//! paired with generated `…Request` / `…Response` structs. Argument names
//! and order follow the UPnP service definitions.

pub mod macros;

use crate::error::Result;
use crate::service::Service;
use soap_client::ArgList;

/// A SOAP action of one of the renderer services
pub trait UpnpAction {
    /// In-arguments (without `InstanceID`, which is filled in automatically)
    type Request;

    /// Out-arguments
    type Response;

    /// The service this action belongs to
    const SERVICE: Service;

    /// The SOAP action name
    const ACTION: &'static str;

    /// Build the ordered in-argument list
    fn arguments(request: &Self::Request) -> ArgList;

    /// Convert the out-arguments of a response
    fn parse_response(out: &ArgList) -> Result<Self::Response>;
}

/// Conversion of a value into its SOAP argument text
pub trait ToArg {
    fn to_arg(&self) -> String;
}

/// Conversion of SOAP argument text into a value
pub trait FromArg: Sized {
    fn from_arg(value: &str) -> Option<Self>;
}

impl ToArg for String {
    fn to_arg(&self) -> String {
        self.clone()
    }
}

impl ToArg for bool {
    fn to_arg(&self) -> String {
        if *self { "1" } else { "0" }.to_string()
    }
}

impl FromArg for String {
    fn from_arg(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl FromArg for bool {
    fn from_arg(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    }
}

macro_rules! numeric_args {
    ($($ty:ty),*) => {
        $(
            impl ToArg for $ty {
                fn to_arg(&self) -> String {
                    self.to_string()
                }
            }

            impl FromArg for $ty {
                fn from_arg(value: &str) -> Option<Self> {
                    value.trim().parse().ok()
                }
            }
        )*
    };
}

numeric_args!(u16, u32, i16, i32);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(true))]
    #[case("0", Some(false))]
    #[case("true", Some(true))]
    #[case(" False ", Some(false))]
    #[case("maybe", None)]
    fn test_bool_from_arg(#[case] input: &str, #[case] expected: Option<bool>) {
        assert_eq!(bool::from_arg(input), expected);
    }

    #[test]
    fn test_bool_to_arg() {
        assert_eq!(true.to_arg(), "1");
        assert_eq!(false.to_arg(), "0");
    }

    #[test]
    fn test_numeric_args() {
        assert_eq!(i32::from_arg(" -12 "), Some(-12));
        assert_eq!(u32::from_arg("x"), None);
        assert_eq!(42u16.to_arg(), "42");
    }
}
