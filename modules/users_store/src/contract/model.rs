use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cache key. Server-assigned ids are positive; optimistic placeholders use negative ids.
pub type UserId = i64;

/// Fully-populated user record as held by the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub maiden_name: String,
    pub age: u32,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub password: String,
    pub birth_date: String,
    pub image: String,
    pub blood_group: String,
    pub height: f64,
    pub weight: f64,
    pub eye_color: String,
    pub hair: Hair,
    pub ip: String,
    pub address: Address,
    pub mac_address: String,
    pub university: String,
    pub bank: Bank,
    pub company: Company,
    pub ein: String,
    pub ssn: String,
    pub user_agent: String,
    pub crypto: Crypto,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hair {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address: String,
    pub city: String,
    pub state: String,
    pub state_code: String,
    pub postal_code: String,
    pub coordinates: Coordinates,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    pub card_expire: String,
    pub card_number: String,
    pub card_type: String,
    pub currency: String,
    pub iban: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub department: String,
    pub name: String,
    pub title: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crypto {
    pub coin: String,
    pub wallet: String,
    pub network: String,
}

/// Partial user record.
///
/// Used for untrusted remote responses, creation payloads and update patches.
/// Numeric fields accept JSON numbers or numeric strings. Any value of the
/// wrong shape, in any field or nested object, reads as absent. Absent fields
/// are skipped on serialization so a patch body only carries what the caller
/// set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawUser {
    #[serde(deserialize_with = "lenient::opt_i64", skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub maiden_name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_u32", skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub hair: Option<RawHair>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub address: Option<RawAddress>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub bank: Option<RawBank>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub company: Option<RawCompany>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub ein: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub crypto: Option<RawCrypto>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Partial update data for a user
pub type UserPatch = RawUser;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHair {
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        rename = "type",
        deserialize_with = "lenient::opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCoordinates {
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_f64", skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAddress {
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<RawCoordinates>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBank {
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub card_expire: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCompany {
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub address: Option<RawAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCrypto {
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub coin: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
    #[serde(deserialize_with = "lenient::opt", skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

// --- full -> partial mapping (every field present) ---

impl From<&Address> for RawAddress {
    fn from(a: &Address) -> Self {
        Self {
            address: Some(a.address.clone()),
            city: Some(a.city.clone()),
            state: Some(a.state.clone()),
            state_code: Some(a.state_code.clone()),
            postal_code: Some(a.postal_code.clone()),
            coordinates: Some(RawCoordinates {
                lat: Some(a.coordinates.lat),
                lng: Some(a.coordinates.lng),
            }),
            country: Some(a.country.clone()),
        }
    }
}

impl From<&User> for RawUser {
    fn from(u: &User) -> Self {
        Self {
            id: Some(u.id),
            first_name: Some(u.first_name.clone()),
            last_name: Some(u.last_name.clone()),
            maiden_name: Some(u.maiden_name.clone()),
            age: Some(u.age),
            gender: Some(u.gender.clone()),
            email: Some(u.email.clone()),
            phone: Some(u.phone.clone()),
            username: Some(u.username.clone()),
            password: Some(u.password.clone()),
            birth_date: Some(u.birth_date.clone()),
            image: Some(u.image.clone()),
            blood_group: Some(u.blood_group.clone()),
            height: Some(u.height),
            weight: Some(u.weight),
            eye_color: Some(u.eye_color.clone()),
            hair: Some(RawHair {
                color: Some(u.hair.color.clone()),
                kind: Some(u.hair.kind.clone()),
            }),
            ip: Some(u.ip.clone()),
            address: Some(RawAddress::from(&u.address)),
            mac_address: Some(u.mac_address.clone()),
            university: Some(u.university.clone()),
            bank: Some(RawBank {
                card_expire: Some(u.bank.card_expire.clone()),
                card_number: Some(u.bank.card_number.clone()),
                card_type: Some(u.bank.card_type.clone()),
                currency: Some(u.bank.currency.clone()),
                iban: Some(u.bank.iban.clone()),
            }),
            company: Some(RawCompany {
                department: Some(u.company.department.clone()),
                name: Some(u.company.name.clone()),
                title: Some(u.company.title.clone()),
                address: Some(RawAddress::from(&u.company.address)),
            }),
            ein: Some(u.ein.clone()),
            ssn: Some(u.ssn.clone()),
            user_agent: Some(u.user_agent.clone()),
            crypto: Some(RawCrypto {
                coin: Some(u.crypto.coin.clone()),
                wallet: Some(u.crypto.wallet.clone()),
                network: Some(u.crypto.network.clone()),
            }),
            role: Some(u.role.clone()),
        }
    }
}

// --- listing ---

/// Fields the view (and the remote listing) can sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Email,
    Age,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Age => "age",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortField(pub String);

impl fmt::Display for UnknownSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort field '{}'", self.0)
    }
}

impl std::error::Error for UnknownSortField {}

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "email" => Ok(SortField::Email),
            "age" => Ok(SortField::Age),
            other => Err(UnknownSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Anything other than `desc` reads as ascending.
    pub fn parse_lenient(s: &str) -> Self {
        if s == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paged listing request sent to the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub limit: u32,
    pub offset: u32,
    pub search: Option<String>,
    pub sort: Option<(SortField, SortOrder)>,
}

impl ListParams {
    pub fn first(limit: u32) -> Self {
        Self {
            limit,
            offset: 0,
            search: None,
            sort: None,
        }
    }
}

/// Listing envelope returned by the remote collection.
///
/// Entries that are not JSON objects are dropped; the rest always decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserList {
    #[serde(deserialize_with = "lenient::records")]
    pub users: Vec<RawUser>,
    #[serde(deserialize_with = "lenient::count")]
    pub total: u64,
}

mod lenient {
    use super::*;
    use serde::de::DeserializeOwned;
    use serde_json::Value;

    /// Wrong-shaped values, including `null`, read as `None`.
    pub fn opt<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).ok())
    }

    pub fn records<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawUser>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(as_f64(&v)
            .filter(|f| *f >= 0.0 && *f <= u64::MAX as f64)
            .map_or(0, |f| f.trunc() as u64))
    }

    fn as_f64(v: &Value) -> Option<f64> {
        let parsed = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|f| f.is_finite())
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(as_f64(&Value::deserialize(d)?))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(match &v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .or_else(|| {
            as_f64(&v)
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }))
    }

    pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(as_f64(&v)
            .filter(|f| *f >= 0.0 && *f <= f64::from(u32::MAX))
            .map(|f| f.trunc() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_user_accepts_numeric_strings_and_ignores_garbage() {
        let raw: RawUser = serde_json::from_value(json!({
            "id": "12",
            "age": "41",
            "height": "180.5",
            "weight": { "kg": 80 },
            "address": { "coordinates": { "lat": "oops", "lng": 12.5 } }
        }))
        .unwrap();

        assert_eq!(raw.id, Some(12));
        assert_eq!(raw.age, Some(41));
        assert_eq!(raw.height, Some(180.5));
        assert_eq!(raw.weight, None);
        let coords = raw.address.unwrap().coordinates.unwrap();
        assert_eq!(coords.lat, None);
        assert_eq!(coords.lng, Some(12.5));
    }

    #[test]
    fn raw_user_negative_age_is_absent() {
        let raw: RawUser = serde_json::from_value(json!({ "age": -3, "id": 7.0 })).unwrap();
        assert_eq!(raw.age, None);
        assert_eq!(raw.id, Some(7));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = UserPatch {
            first_name: Some("Ann".into()),
            hair: Some(RawHair {
                color: None,
                kind: Some("Wavy".into()),
            }),
            ..Default::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, json!({ "firstName": "Ann", "hair": { "type": "Wavy" } }));
    }

    #[test]
    fn sort_tokens_parse_and_render() {
        assert_eq!("age".parse::<SortField>().unwrap(), SortField::Age);
        assert_eq!(SortField::Name.to_string(), "name");
        assert!("height".parse::<SortField>().is_err());
        assert_eq!(SortOrder::parse_lenient("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse_lenient("DESC"), SortOrder::Asc);
        assert_eq!(SortOrder::default(), SortOrder::Asc);
    }

    #[test]
    fn user_list_tolerates_missing_fields() {
        let list: UserList = serde_json::from_value(json!({ "users": [{ "id": 1 }] })).unwrap();
        assert_eq!(list.users.len(), 1);
        assert_eq!(list.total, 0);
    }

    #[test]
    fn wrong_shaped_fields_read_as_absent() {
        let raw: RawUser = serde_json::from_value(json!({
            "id": 2,
            "firstName": ["Ann"],
            "phone": 5551234,
            "hair": "bald",
            "address": { "city": 7, "coordinates": "north" },
            "company": { "name": "Acme", "address": null },
            "role": null
        }))
        .unwrap();

        assert_eq!(raw.id, Some(2));
        assert_eq!(raw.first_name, None);
        assert_eq!(raw.phone, None);
        assert_eq!(raw.hair, None);
        assert_eq!(raw.role, None);
        let address = raw.address.unwrap();
        assert_eq!(address.city, None);
        assert_eq!(address.coordinates, None);
        let company = raw.company.unwrap();
        assert_eq!(company.name.as_deref(), Some("Acme"));
        assert_eq!(company.address, None);
    }

    #[test]
    fn one_bad_record_does_not_reject_the_list() {
        let list: UserList = serde_json::from_value(json!({
            "users": [
                { "id": 1, "firstName": "Ok" },
                { "id": 2, "phone": 5551234 },
                { "id": 3, "hair": "bald" },
                "not a record"
            ],
            "total": "3"
        }))
        .unwrap();

        let ids: Vec<_> = list.users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(list.users[0].first_name.as_deref(), Some("Ok"));
        assert_eq!(list.total, 3);
    }
}
