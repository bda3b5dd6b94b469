/// Build a [`Reason`](crate::Reason) from heterogeneous expressions.
///
/// Each item is converted with `serde_json::to_value`; values that cannot
/// be represented as JSON become `null`.
///
/// ```
/// use errtrail::reason;
/// let r = reason![42, "ctx", Some(1.5)];
/// assert_eq!(r.len(), 3);
/// ```
#[macro_export]
macro_rules! reason {
    () => {
        ::std::vec::Vec::<$crate::__private::Value>::new()
    };
    ($($item:expr),+ $(,)?) => {
        ::std::vec![$( $crate::__private::to_value(&$item).unwrap_or_default() ),+]
    };
}

/// Path of the enclosing function, e.g. `my_crate::store::load`.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_path {
    () => {{
        fn __here() {}
        fn __name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        let name = __name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

/// Capture the current [`CallSite`](crate::CallSite), enclosing function included.
#[macro_export]
macro_rules! site {
    () => {
        $crate::CallSite::new($crate::__function_path!(), file!(), line!())
    };
}

/// Construct an [`ErrorRecord`](crate::ErrorRecord) here.
///
/// ```ignore
/// // Basic: just the code
/// trail!("quota exceeded")
///
/// // With a first reason appended right away:
/// trail!("quota exceeded", user_id, limit)
/// ```
#[macro_export]
macro_rules! trail {
    ($code:expr $(,)?) => {
        $crate::ErrorRecord::new_at($code, $crate::site!())
    };
    ($code:expr, $($item:expr),+ $(,)?) => {{
        let __site = $crate::site!();
        $crate::ErrorRecord::new_at($code, __site).annotate_at($crate::reason![$($item),+], __site)
    }};
}

/// Annotate a record here.
///
/// ```ignore
/// return Err(annotate!(err, user_id, "while loading"));
/// ```
#[macro_export]
macro_rules! annotate {
    ($record:expr $(, $item:expr)* $(,)?) => {
        ($record).annotate_at($crate::reason![$($item),*], $crate::site!())
    };
}
