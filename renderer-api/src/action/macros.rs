//! Declarative macro for SOAP action definitions
//!
//! Instead of implementing [`UpnpAction`](crate::action::UpnpAction) by
//! hand, actions are declared with their argument names and types; the macro
//! generates the marker type, the request and response structs and the
//! argument conversions.

/// Define a UPnP action with typed in- and out-arguments
///
/// `instance_id: "0",` prepends the `InstanceID` argument that every
/// AVTransport and RenderingControl action carries.
///
/// # Example
/// ```rust,ignore
/// define_action! {
///     action: GetVolume,
///     service: RenderingControl,
///     instance_id: "0",
///     request: {
///         channel: String => "Channel",
///     },
///     response: {
///         current_volume: i32 => "CurrentVolume",
///     },
/// }
/// ```
#[macro_export]
macro_rules! define_action {
    (
        $(#[$meta:meta])*
        action: $name:ident,
        service: $service:ident,
        $(instance_id: $iid:literal,)?
        request: {
            $($field:ident: $field_type:ty => $arg:literal),* $(,)?
        },
        response: {
            $($resp_field:ident: $resp_type:ty => $resp_arg:literal),* $(,)?
        } $(,)?
    ) => {
        $crate::__paste! {
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            #[derive(Debug, Clone, PartialEq, Default)]
            pub struct [<$name Request>] {
                $(pub $field: $field_type,)*
            }

            #[derive(Debug, Clone, PartialEq, Default)]
            pub struct [<$name Response>] {
                $(pub $resp_field: $resp_type,)*
            }

            impl $crate::action::UpnpAction for $name {
                type Request = [<$name Request>];
                type Response = [<$name Response>];

                const SERVICE: $crate::service::Service = $crate::service::Service::$service;
                const ACTION: &'static str = stringify!($name);

                fn arguments(request: &Self::Request) -> $crate::ArgList {
                    let _ = request;
                    #[allow(unused_mut)]
                    let mut args = $crate::ArgList::new();
                    $(args.push("InstanceID", $iid);)?
                    $(args.push($arg, $crate::action::ToArg::to_arg(&request.$field));)*
                    args
                }

                fn parse_response(out: &$crate::ArgList) -> $crate::error::Result<Self::Response> {
                    let _ = out;
                    Ok([<$name Response>] {
                        $($resp_field: out
                            .get($resp_arg)
                            .and_then(<$resp_type as $crate::action::FromArg>::from_arg)
                            .unwrap_or_default(),)*
                    })
                }
            }
        }
    };
}
