/// Declares a typed interface backed by a [`Proxy`](crate::proxy::Proxy).
///
/// Every method takes its parameters followed by a completion, and is routed through
/// [`Proxy::invoke_as`](crate::proxy::Proxy::invoke_as) using the signature text given after
/// `=`. Parameters are converted with [`RpcParam`](crate::transform::RpcParam), results with
/// [`FromWire`](crate::transform::FromWire).
///
/// ```rust
/// use jrpc_core::rpc_interface;
///
/// rpc_interface! {
///     pub struct Calculator {
///         /// Subtracts `subtrahend` from `minuend`.
///         fn subtract(minuend: i64, subtrahend: i64) -> i64
///             = "subtractWithMinuend:subtrahend:completion:";
///         fn reset() -> () = "reset(completion:)";
///     }
/// }
///
/// assert_eq!(Calculator::signatures().len(), 2);
/// ```
#[macro_export]
macro_rules! rpc_interface {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$method_meta:meta])*
                fn $method:ident($($arg:ident : $arg_ty:ty),* $(,)?) -> $ret:ty = $signature:literal;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            proxy: $crate::proxy::Proxy,
        }

        impl $name {
            /// The signatures of every method of the interface, in declaration order.
            pub fn signatures() -> ::std::vec::Vec<$crate::descriptor::MethodSignature> {
                ::std::vec![$($crate::descriptor::MethodSignature::new($signature)),*]
            }

            /// Builds the interface on a proxy configured by `builder`.
            pub fn build(
                builder: $crate::proxy::ProxyBuilder,
            ) -> ::std::result::Result<Self, $crate::error::ConstructionError> {
                let proxy = builder.build(::std::stringify!($name), Self::signatures())?;
                ::std::result::Result::Ok(Self { proxy })
            }

            /// The proxy every method is routed through.
            pub fn proxy(&self) -> &$crate::proxy::Proxy {
                &self.proxy
            }

            $(
                $(#[$method_meta])*
                pub fn $method<F>(
                    &self,
                    $($arg: $arg_ty,)*
                    completion: F,
                ) -> ::std::result::Result<(), $crate::error::CallError>
                where
                    F: ::std::ops::FnOnce(
                            ::std::result::Result<$ret, $crate::error::ProxyError>,
                        ) + ::std::marker::Send
                        + 'static,
                {
                    self.proxy.invoke_as::<$ret, F>(
                        $signature,
                        ::std::vec![$($crate::transform::RpcParam::into_argument($arg)),*],
                        completion,
                    )
                }
            )*
        }
    };
}
