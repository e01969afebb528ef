//! Date and time utilities.

use std::{cmp::Ordering, fmt, marker::PhantomData, ops, time::Duration};

use derive_more::Debug;
use time::{
    error::Parse as ParseError,
    format_description::well_known::{Iso8601, Rfc3339},
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// UTC date and time, tagged with the kind of moment it describes.
///
/// Kinds are coerced explicitly with [`DateTimeOf::coerce()`], so a creation
/// moment is never compared to an expiration one by accident.
#[derive(Debug)]
#[debug("{inner}")]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// UTC moment.
    inner: OffsetDateTime,

    /// Kind of the moment.
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Unix epoch.
    pub const UNIX_EPOCH: Self = Self {
        inner: OffsetDateTime::UNIX_EPOCH,
        _of: PhantomData,
    };

    /// Wraps the provided moment, converting it to UTC.
    fn utc(inner: OffsetDateTime) -> Self {
        Self {
            inner: inner.to_offset(UtcOffset::UTC),
            _of: PhantomData,
        }
    }

    /// Returns the current system date and time.
    ///
    /// Prefer a [`Clock`] where the current moment affects decisions.
    #[must_use]
    pub fn now() -> Self {
        Self::utc(OffsetDateTime::now_utc())
    }

    /// Creates a new [`DateTimeOf`] from the provided Unix `timestamp` in
    /// seconds.
    ///
    /// [`None`] if the `timestamp` is out of the supported range.
    #[must_use]
    pub fn from_unix_timestamp(timestamp: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(timestamp).ok().map(Self::utc)
    }

    /// Returns the Unix timestamp of this [`DateTimeOf`] in seconds.
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.inner.unix_timestamp()
    }

    /// Parses an [RFC 3339] string.
    ///
    /// # Errors
    ///
    /// If the `input` is not a valid [RFC 3339] date and time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, ParseError> {
        OffsetDateTime::parse(input, &Rfc3339).map(Self::utc)
    }

    /// Parses an [ISO 8601] string, treating a missing offset as UTC.
    ///
    /// # Errors
    ///
    /// If the `input` is not a valid [ISO 8601] date and time.
    ///
    /// [ISO 8601]: https://en.wikipedia.org/wiki/ISO_8601
    pub fn from_iso8601(input: &str) -> Result<Self, ParseError> {
        Self::from_rfc3339(input).or_else(|_| {
            PrimitiveDateTime::parse(input, &Iso8601::DEFAULT)
                .map(|naive| Self::utc(naive.assume_utc()))
        })
    }

    /// Coerces one kind of [`DateTimeOf`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

/// Formats as [RFC 3339].
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
impl<Of: ?Sized> fmt::Display for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted =
            self.inner.format(&Rfc3339).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

/// Source of the current [`DateTime`].
///
/// Expiration checks must use the same [`Clock`] as the code acting upon
/// their result.
pub trait Clock {
    /// Returns the current [`DateTime`] according to this [`Clock`].
    fn now(&self) -> DateTime;
}

/// [`Clock`] backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        DateTime::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime {
        (**self).now()
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::utc(self.inner + rhs)
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! [`serde`] representations of [`DateTimeOf`], to be used with
    //! `#[serde(with = "...")]`.

    pub mod unix_timestamp {
        //! [`DateTimeOf`] as an integer number of seconds since the Unix
        //! epoch.

        use std::{fmt, marker::PhantomData};

        use serde::{de, Deserializer, Serializer};

        use crate::DateTimeOf;

        /// Serializes the provided [`DateTimeOf`] as a Unix timestamp.
        ///
        /// # Errors
        ///
        /// Only propagates `serializer` errors.
        pub fn serialize<Of: ?Sized, S: Serializer>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_i64(dt.unix_timestamp())
        }

        /// Deserializes a [`DateTimeOf`] from a Unix timestamp.
        ///
        /// Fractional timestamps are truncated to whole seconds.
        ///
        /// # Errors
        ///
        /// If the value is not a number, or is out of range.
        pub fn deserialize<'de, Of: ?Sized, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error> {
            deserializer.deserialize_i64(Visitor(PhantomData))
        }

        /// [`de::Visitor`] of a numeric Unix timestamp.
        struct Visitor<Of: ?Sized>(PhantomData<Of>);

        impl<Of: ?Sized> Visitor<Of> {
            fn at<E: de::Error>(timestamp: i64) -> Result<DateTimeOf<Of>, E> {
                DateTimeOf::from_unix_timestamp(timestamp).ok_or_else(|| {
                    E::custom(format!("timestamp {timestamp} out of range"))
                })
            }
        }

        impl<Of: ?Sized> de::Visitor<'_> for Visitor<Of> {
            type Value = DateTimeOf<Of>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a Unix timestamp in seconds")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Self::at(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v).map_err(E::custom).and_then(Self::at)
            }

            #[expect(
                clippy::cast_possible_truncation,
                reason = "out of range values are rejected afterwards"
            )]
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if !v.is_finite() {
                    return Err(E::custom("timestamp must be finite"));
                }
                Self::at(v.trunc() as i64)
            }
        }
    }

    pub mod iso8601 {
        //! [`DateTimeOf`] as an [ISO 8601] string, written as [RFC 3339].
        //!
        //! [ISO 8601]: https://en.wikipedia.org/wiki/ISO_8601
        //! [RFC 3339]: https://tools.ietf.org/html/rfc3339

        use std::borrow::Cow;

        use serde::{de, Deserialize as _, Deserializer, Serializer};

        use crate::DateTimeOf;

        /// Serializes the provided [`DateTimeOf`] as an [RFC 3339] string.
        ///
        /// # Errors
        ///
        /// Only propagates `serializer` errors.
        ///
        /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
        pub fn serialize<Of: ?Sized, S: Serializer>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_str(dt)
        }

        /// Deserializes a [`DateTimeOf`] from an [ISO 8601] string.
        ///
        /// # Errors
        ///
        /// If the value is not a valid date and time string.
        pub fn deserialize<'de, Of: ?Sized, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error> {
            let raw = Cow::<'de, str>::deserialize(deserializer)?;
            DateTimeOf::from_iso8601(&raw).map_err(de::Error::custom)
        }
    }
}
