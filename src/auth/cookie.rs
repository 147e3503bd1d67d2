//! Defines functions for remembering the signed in principal with a cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::record::OwnerId;

pub(crate) const COOKIE_OWNER_ID: &str = "owner_id";
/// The default duration for which owner cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::days(1);

/// Add an owner cookie to the cookie jar, indicating that `owner_id` is signed in.
///
/// The cookie expires `duration` from the current time. Browsers only send it
/// back over HTTPS when `secure` is set.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_owner_cookie(
    jar: PrivateCookieJar,
    owner_id: &OwnerId,
    duration: Duration,
    secure: bool,
) -> PrivateCookieJar {
    let expiry = OffsetDateTime::now_utc() + duration;

    jar.add(
        Cookie::build((COOKIE_OWNER_ID, owner_id.to_string()))
            .expires(expiry)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(secure),
    )
}

/// Set the owner cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_owner_cookie(jar: PrivateCookieJar, secure: bool) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_OWNER_ID, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(secure),
    )
}

/// The owner stored in the cookie jar, if any.
///
/// Cookies that fail to decrypt are dropped by the jar, so a tampered cookie
/// reads the same as no cookie.
pub(crate) fn get_owner_from_cookie(jar: &PrivateCookieJar) -> Option<OwnerId> {
    jar.get(COOKIE_OWNER_ID)
        .map(|cookie| cookie.value_trimmed().to_owned())
        .filter(|owner_id| !owner_id.is_empty())
        .map(OwnerId::new)
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::cookie::{
            COOKIE_OWNER_ID, DEFAULT_COOKIE_DURATION, get_owner_from_cookie,
            invalidate_owner_cookie, set_owner_cookie,
        },
        record::OwnerId,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    #[test]
    fn set_cookie_succeeds() {
        let jar = get_jar();
        let owner_id = OwnerId::new("user_2abc");

        let jar = set_owner_cookie(jar, &owner_id, DEFAULT_COOKIE_DURATION, false);
        let cookie = jar
            .get(COOKIE_OWNER_ID)
            .expect("could not get owner cookie");

        assert_eq!(cookie.value(), "user_2abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));

        let expiry = cookie
            .expires_datetime()
            .expect("owner cookie should have an expiry");
        let want_expiry = OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION;
        assert!(
            (want_expiry - expiry).abs() < Duration::seconds(1),
            "got expiry {expiry:?}, want {want_expiry:?}"
        );
    }

    #[test]
    fn secure_flag_is_passed_through() {
        let owner_id = OwnerId::new("user_2abc");

        let jar = set_owner_cookie(get_jar(), &owner_id, DEFAULT_COOKIE_DURATION, true);
        assert_eq!(jar.get(COOKIE_OWNER_ID).unwrap().secure(), Some(true));

        let jar = invalidate_owner_cookie(jar, true);
        assert_eq!(jar.get(COOKIE_OWNER_ID).unwrap().secure(), Some(true));

        let jar = invalidate_owner_cookie(jar, false);
        assert_eq!(jar.get(COOKIE_OWNER_ID).unwrap().secure(), Some(false));
    }

    #[test]
    fn reads_owner_back() {
        let owner_id = OwnerId::new("user_2abc");
        let jar = set_owner_cookie(get_jar(), &owner_id, DEFAULT_COOKIE_DURATION, false);

        assert_eq!(get_owner_from_cookie(&jar), Some(owner_id));
    }

    #[test]
    fn empty_jar_has_no_owner() {
        assert_eq!(get_owner_from_cookie(&get_jar()), None);
    }

    #[test]
    fn blank_owner_is_ignored() {
        let jar = get_jar().add(Cookie::new(COOKIE_OWNER_ID, "  "));

        assert_eq!(get_owner_from_cookie(&jar), None);
    }

    #[test]
    fn invalidate_cookie_succeeds() {
        let jar = set_owner_cookie(
            get_jar(),
            &OwnerId::new("user_2abc"),
            DEFAULT_COOKIE_DURATION,
            false,
        );

        let jar = invalidate_owner_cookie(jar, false);
        let cookie = jar
            .get(COOKIE_OWNER_ID)
            .expect("could not get owner cookie");

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
