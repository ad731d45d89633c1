//! Pure form validation.
//!
//! Each form validates to a [`FormErrors`] map: field name to a single
//! human-readable message, absent key = valid field. A form is submittable
//! iff its map is empty. Validation never touches the network and never
//! panics on user input.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use portal_client::{Gender, NewMember, ProfileUpdate};
use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// Indonesian mobile numbers: 0 / 62 / +62 prefix, then 8 and 7-10 digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+62|62|0)8[1-9][0-9]{6,9}$").expect("valid phone pattern"));

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    FullName,
    Email,
    Password,
    ConfirmPassword,
    PhoneNumber,
    Gender,
    BirthDate,
    Address,
}

pub type FormErrors = BTreeMap<FormField, String>;

pub fn is_form_valid(errors: &FormErrors) -> bool {
    errors.is_empty()
}

fn check_full_name(errors: &mut FormErrors, full_name: &str) {
    if full_name.trim().is_empty() {
        errors.insert(FormField::FullName, "Nama lengkap wajib diisi".into());
    }
}

fn check_email(errors: &mut FormErrors, email: &str) {
    if email.trim().is_empty() {
        errors.insert(FormField::Email, "Email wajib diisi".into());
    } else if !EMAIL_RE.is_match(email) {
        errors.insert(FormField::Email, "Format email tidak valid".into());
    }
}

fn check_password(errors: &mut FormErrors, password: &str) {
    if password.is_empty() {
        errors.insert(FormField::Password, "Password wajib diisi".into());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(FormField::Password, "Password minimal 6 karakter".into());
    }
}

fn check_confirm_password(errors: &mut FormErrors, password: &str, confirm: &str) {
    if confirm.is_empty() {
        errors.insert(
            FormField::ConfirmPassword,
            "Konfirmasi password wajib diisi".into(),
        );
    } else if password != confirm {
        errors.insert(
            FormField::ConfirmPassword,
            "Password dan konfirmasi password tidak sama".into(),
        );
    }
}

fn check_phone_number(errors: &mut FormErrors, phone_number: &str) {
    if phone_number.trim().is_empty() {
        errors.insert(FormField::PhoneNumber, "Nomor HP wajib diisi".into());
    } else if !PHONE_RE.is_match(phone_number) {
        errors.insert(
            FormField::PhoneNumber,
            "Format nomor HP tidak valid (format: 08xxxxxxxxxx)".into(),
        );
    }
}

fn check_gender(errors: &mut FormErrors, gender: Option<Gender>) {
    if gender.is_none() {
        errors.insert(FormField::Gender, "Gender wajib dipilih".into());
    }
}

fn check_birth_date(errors: &mut FormErrors, birth_date: &str) {
    if birth_date.is_empty() {
        errors.insert(FormField::BirthDate, "Tanggal lahir wajib diisi".into());
    }
}

fn check_address(errors: &mut FormErrors, address: &str) {
    if address.trim().is_empty() {
        errors.insert(FormField::Address, "Alamat wajib diisi".into());
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        errors
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone_number: String,
    pub gender: Option<Gender>,
    pub birth_date: String,
    pub address: String,
}

impl RegisterForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        check_full_name(&mut errors, &self.full_name);
        check_email(&mut errors, &self.email);
        check_password(&mut errors, &self.password);
        check_confirm_password(&mut errors, &self.password, &self.confirm_password);
        check_phone_number(&mut errors, &self.phone_number);
        check_gender(&mut errors, self.gender);
        check_birth_date(&mut errors, &self.birth_date);
        check_address(&mut errors, &self.address);
        errors
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberForm {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: Option<Gender>,
    pub birth_date: String,
    pub address: String,
}

impl MemberForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        check_full_name(&mut errors, &self.full_name);
        check_email(&mut errors, &self.email);
        check_phone_number(&mut errors, &self.phone_number);
        check_gender(&mut errors, self.gender);
        check_birth_date(&mut errors, &self.birth_date);
        check_address(&mut errors, &self.address);
        errors
    }

    /// Wire body for `POST /members`. `None` until a gender is selected,
    /// which validation reports first anyway.
    pub fn into_new_member(self) -> Option<NewMember> {
        Some(NewMember {
            full_name: self.full_name,
            email: self.email,
            phone_number: self.phone_number,
            gender: self.gender?,
            birth_date: self.birth_date,
            address: self.address,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub initial_name: String,
    pub full_name: String,
    pub university: String,
    pub phone_number: String,
}

impl ProfileForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        check_full_name(&mut errors, &self.full_name);
        check_phone_number(&mut errors, &self.phone_number);
        errors
    }

    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            initial_name: self.initial_name.clone(),
            full_name: self.full_name.clone(),
            university: self.university.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

/// Which fields have been blurred at least once.
///
/// Inline per-field errors only show for touched fields; submit-time
/// validation is unconditional and uses the full error map directly.
#[derive(Debug, Clone, Default)]
pub struct Touched(BTreeSet<FormField>);

impl Touched {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&mut self, field: FormField) {
        self.0.insert(field);
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains(&field)
    }

    /// Filter a full error map down to the fields the user has touched.
    pub fn visible_errors(&self, errors: &FormErrors) -> FormErrors {
        errors
            .iter()
            .filter(|(field, _)| self.0.contains(field))
            .map(|(field, message)| (*field, message.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_register_form() -> RegisterForm {
        RegisterForm {
            full_name: "Budi Santoso".into(),
            email: "budi@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            phone_number: "081234567890".into(),
            gender: Some(Gender::Male),
            birth_date: "1999-04-01".into(),
            address: "Jl. Sudirman 1".into(),
        }
    }

    #[test]
    fn empty_register_form_flags_every_required_field() {
        let errors = RegisterForm::default().validate();
        for field in [
            FormField::FullName,
            FormField::Email,
            FormField::Password,
            FormField::ConfirmPassword,
            FormField::PhoneNumber,
            FormField::Gender,
            FormField::BirthDate,
            FormField::Address,
        ] {
            assert!(errors.contains_key(&field), "missing error for {field:?}");
        }
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn valid_register_form_is_submittable() {
        let errors = valid_register_form().validate();
        assert!(is_form_valid(&errors), "unexpected errors: {errors:?}");
    }

    #[test]
    fn email_vectors() {
        let check = |email: &str| {
            LoginForm {
                email: email.into(),
                password: "secret1".into(),
            }
            .validate()
            .contains_key(&FormField::Email)
        };
        assert!(!check("a@b.co"));
        assert!(check("a@b"));
        assert!(check(""));
        assert!(check("a b@c.com"));
    }

    #[test]
    fn phone_vectors() {
        let check = |phone: &str| {
            let mut form = valid_register_form();
            form.phone_number = phone.into();
            form.validate().contains_key(&FormField::PhoneNumber)
        };
        assert!(!check("081234567890"));
        assert!(!check("+6281234567890"));
        assert!(check("1234567"));
        assert!(check("62812345")); // too short
    }

    #[test]
    fn mismatched_password_confirmation_is_an_error() {
        let mut form = valid_register_form();
        form.password = "secret1".into();
        form.confirm_password = "secret2".into();
        assert!(form.validate().contains_key(&FormField::ConfirmPassword));

        form.confirm_password = "secret1".into();
        assert!(!form.validate().contains_key(&FormField::ConfirmPassword));
    }

    #[test]
    fn whitespace_only_name_and_address_are_rejected() {
        let mut form = valid_register_form();
        form.full_name = "   ".into();
        form.address = "\t".into();
        let errors = form.validate();
        assert!(errors.contains_key(&FormField::FullName));
        assert!(errors.contains_key(&FormField::Address));
    }

    #[test]
    fn short_password_is_rejected() {
        let mut form = valid_register_form();
        form.password = "12345".into();
        form.confirm_password = "12345".into();
        assert_eq!(
            form.validate().get(&FormField::Password).map(String::as_str),
            Some("Password minimal 6 karakter")
        );
    }

    #[test]
    fn untouched_fields_hide_their_errors() {
        let errors = RegisterForm::default().validate();

        let mut touched = Touched::new();
        assert!(touched.visible_errors(&errors).is_empty());

        touched.touch(FormField::Email);
        let visible = touched.visible_errors(&errors);
        assert_eq!(visible.len(), 1);
        assert!(visible.contains_key(&FormField::Email));
    }

    #[test]
    fn member_form_without_gender_never_builds_a_request() {
        let form = MemberForm {
            full_name: "Budi".into(),
            email: "budi@example.com".into(),
            phone_number: "081234567890".into(),
            gender: None,
            birth_date: "1999-04-01".into(),
            address: "Jl. Sudirman 1".into(),
        };
        assert!(form.validate().contains_key(&FormField::Gender));
        assert!(form.into_new_member().is_none());
    }
}
