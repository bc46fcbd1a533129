use chrono::{DateTime, Utc};

///
/// FromBucketKey
///
/// Parses a bucket key (always text on the wire) into a typed value.
/// Enum types get an implementation from `impl_enum_value!`.
///

pub trait FromBucketKey: Sized {
    fn from_bucket_key(key: &str) -> Option<Self>;
}

// impl_from_bucket_key
macro_rules! impl_from_bucket_key {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl FromBucketKey for $type {
                fn from_bucket_key(key: &str) -> Option<Self> {
                    key.parse().ok()
                }
            }
        )*
    };
}

impl_from_bucket_key!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl FromBucketKey for String {
    fn from_bucket_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }
}

/// Boolean terms come back as `true`/`false` or as `1`/`0`.
impl FromBucketKey for bool {
    fn from_bucket_key(key: &str) -> Option<Self> {
        match key {
            "1" => Some(true),
            "0" => Some(false),
            _ if key.eq_ignore_ascii_case("true") => Some(true),
            _ if key.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

/// RFC 3339 text, or epoch milliseconds when the backend sent no
/// formatted key.
impl FromBucketKey for DateTime<Utc> {
    fn from_bucket_key(key: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(key)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                key.parse::<i64>()
                    .ok()
                    .and_then(DateTime::from_timestamp_millis)
            })
    }
}

impl<T: FromBucketKey> FromBucketKey for Option<T> {
    fn from_bucket_key(key: &str) -> Option<Self> {
        T::from_bucket_key(key).map(Some)
    }
}
