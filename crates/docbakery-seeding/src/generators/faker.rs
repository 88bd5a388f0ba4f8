//! Fake data categories used for text fields.

use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, CountryName, PostCode, StreetName};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::{DomainSuffix, IPv4, SafeEmail, Username};
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use rand::rngs::StdRng;

/// Semantic category of a generated string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakerType {
	/// A single lorem word.
	Word,
	/// An email address on a reserved domain.
	Email,
	/// A full person name.
	Name,
	/// A given name.
	FirstName,
	/// A family name.
	LastName,
	/// A login handle.
	Username,
	/// A phone number.
	PhoneNumber,
	/// A city name.
	City,
	/// A country name.
	Country,
	/// A company name.
	Company,
	/// A street address (number and street).
	StreetAddress,
	/// A postal code.
	ZipCode,
	/// A short lorem sentence.
	Sentence,
	/// An https URL.
	Url,
	/// An IPv4 address.
	Ipv4,
}

impl FakerType {
	/// Category matching a field name, if the name is recognized.
	///
	/// ```
	/// use docbakery_seeding::generators::FakerType;
	///
	/// assert_eq!(FakerType::from_field_name("email"), Some(FakerType::Email));
	/// assert_eq!(FakerType::from_field_name("Email"), Some(FakerType::Email));
	/// assert_eq!(FakerType::from_field_name("title"), None);
	/// ```
	pub fn from_field_name(name: &str) -> Option<Self> {
		let faker = match name.to_ascii_lowercase().as_str() {
			"email" | "email_address" => Self::Email,
			"name" | "full_name" => Self::Name,
			"first_name" => Self::FirstName,
			"last_name" => Self::LastName,
			"username" | "user_name" => Self::Username,
			"phone" | "phone_number" => Self::PhoneNumber,
			"city" => Self::City,
			"country" => Self::Country,
			"company" => Self::Company,
			"address" | "street_address" => Self::StreetAddress,
			"zipcode" | "zip_code" | "postcode" => Self::ZipCode,
			"sentence" | "text" => Self::Sentence,
			"url" => Self::Url,
			"ipv4" | "ip_address" => Self::Ipv4,
			"word" => Self::Word,
			_ => return None,
		};
		Some(faker)
	}

	/// Generate a value of this category.
	pub fn generate(self, rng: &mut StdRng) -> String {
		match self {
			Self::Word => Word().fake_with_rng(rng),
			Self::Email => SafeEmail().fake_with_rng(rng),
			Self::Name => Name().fake_with_rng(rng),
			Self::FirstName => FirstName().fake_with_rng(rng),
			Self::LastName => LastName().fake_with_rng(rng),
			Self::Username => Username().fake_with_rng(rng),
			Self::PhoneNumber => PhoneNumber().fake_with_rng(rng),
			Self::City => CityName().fake_with_rng(rng),
			Self::Country => CountryName().fake_with_rng(rng),
			Self::Company => CompanyName().fake_with_rng(rng),
			Self::StreetAddress => {
				let number: String = BuildingNumber().fake_with_rng(rng);
				let street: String = StreetName().fake_with_rng(rng);
				format!("{number} {street}")
			}
			Self::ZipCode => PostCode().fake_with_rng(rng),
			Self::Sentence => Sentence(3..8).fake_with_rng(rng),
			Self::Url => {
				let host: String = Word().fake_with_rng(rng);
				let suffix: String = DomainSuffix().fake_with_rng(rng);
				format!("https://{host}.{suffix}")
			}
			Self::Ipv4 => IPv4().fake_with_rng(rng),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rstest::rstest;

	#[rstest]
	#[case("email", FakerType::Email)]
	#[case("user_name", FakerType::Username)]
	#[case("postcode", FakerType::ZipCode)]
	#[case("FIRST_NAME", FakerType::FirstName)]
	fn test_from_field_name(#[case] name: &str, #[case] expected: FakerType) {
		assert_eq!(FakerType::from_field_name(name), Some(expected));
	}

	#[rstest]
	fn test_unrecognized_name_has_no_category() {
		assert_eq!(FakerType::from_field_name("nickname_hash"), None);
	}

	#[rstest]
	fn test_email_is_email_shaped() {
		let mut rng = StdRng::seed_from_u64(7);
		let email = FakerType::Email.generate(&mut rng);
		let (local, domain) = email.split_once('@').unwrap();
		assert!(!local.is_empty());
		assert!(domain.contains('.'));
	}

	#[rstest]
	fn test_url_and_ipv4_shapes() {
		let mut rng = StdRng::seed_from_u64(11);
		assert!(FakerType::Url.generate(&mut rng).starts_with("https://"));
		assert_eq!(FakerType::Ipv4.generate(&mut rng).split('.').count(), 4);
	}

	#[rstest]
	fn test_same_seed_same_value() {
		let mut first = StdRng::seed_from_u64(42);
		let mut second = StdRng::seed_from_u64(42);
		assert_eq!(
			FakerType::Name.generate(&mut first),
			FakerType::Name.generate(&mut second)
		);
	}
}
