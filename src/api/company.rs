use super::error::ApiErr;
use super::user::MessageDto;
use crate::middleware::auth::{
    check_passwords, create_token, generate_account_token, hash_password, Token,
};
use crate::repo::company::{
    create_company, get_companies_by_sector, get_company_by_email,
    get_company_by_email_or_legal_id, get_company_by_id, get_company_by_reset_token,
    get_company_by_verification_token, get_company_profile_by_id, list_companies,
    update_company as repo_update_company, CompanyProfile, CompanySummary,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Duration;
use entity::entities::company;
use sea_orm::{prelude::Uuid, ActiveValue::Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

/// Axum handler for company registration. A company is a duplicate when
/// either the email or the legal id is already taken.
pub async fn register_company(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<RegisterCompanyDto>,
) -> Result<Json<RegisteredCompanyDto>, ApiErr> {
    if get_company_by_email_or_legal_id(&db, &payload.email, &payload.legal_id)
        .await?
        .is_some()
    {
        return Err(ApiErr::CompanyExist);
    }

    let hashed_password = hash_password(&payload.password).map_err(|_| ApiErr::PasswordHash)?;
    let verification_token = generate_account_token();

    let company_model = company::ActiveModel {
        id: Set(Uuid::new_v4()),
        legal_id: Set(payload.legal_id),
        name: Set(payload.name),
        email: Set(payload.email),
        password: Set(hashed_password),
        sectors: Set(payload.sectors),
        verified: Set(false),
        verification_token: Set(Some(verification_token.clone())),
        ..Default::default()
    };

    let company_res = create_company(&db, company_model).await?;
    let current_company = get_company_by_id(&db, company_res.last_insert_id)
        .await?
        .ok_or(ApiErr::CompanyNotExist)?;

    tracing::info!(
        "verification token issued for {}: {verification_token}",
        current_company.email
    );

    Ok(Json(RegisteredCompanyDto {
        status: "success".to_owned(),
        message: "Company registered. Please verify your email.".to_owned(),
        company: current_company.into(),
    }))
}

/// Axum handler marking a company account as verified via its emailed token.
pub async fn verify_company(
    State(db): State<DatabaseConnection>,
    Path(token): Path<String>,
) -> Result<Json<MessageDto>, ApiErr> {
    let company = get_company_by_verification_token(&db, &token)
        .await?
        .ok_or(ApiErr::InvalidToken)?;

    let mut company_model: company::ActiveModel = company.into();
    company_model.verified = Set(true);
    company_model.verification_token = Set(None);
    repo_update_company(&db, company_model).await?;

    Ok(Json(MessageDto {
        status: "success".to_owned(),
        message: "Account verified".to_owned(),
    }))
}

/// Axum handler for company login. The response is flagged so the client
/// can route to the company dashboard.
pub async fn login_company(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginCompanyDto>,
) -> Result<Json<CompanyLoginDto>, ApiErr> {
    let current_company = get_company_by_email(&db, &payload.email)
        .await?
        .ok_or(ApiErr::CompanyNotExist)?;

    check_passwords(&payload.password, &current_company.password)
        .map_err(|_| ApiErr::WrongPassword)?;

    let token = create_token(&current_company.id).map_err(|_| ApiErr::TokenCreation)?;

    Ok(Json(CompanyLoginDto {
        status: "success".to_owned(),
        message: "Company logged in".to_owned(),
        company: current_company.into(),
        token,
        is_company: true,
    }))
}

/// Axum handler for partial profile update of the logged in company.
pub async fn update_company(
    State(db): State<DatabaseConnection>,
    Extension(token): Extension<Token>,
    Json(payload): Json<UpdateCompanyDto>,
) -> Result<Json<RegisteredCompanyDto>, ApiErr> {
    let company_before = get_company_by_id(&db, token.id)
        .await?
        .ok_or(ApiErr::CompanyNotExist)?;

    let mut company_model: company::ActiveModel = company_before.into();

    if let Some(name) = payload.name {
        company_model.name = Set(name);
    }
    if let Some(email) = payload.email {
        company_model.email = Set(email);
    }
    if let Some(sectors) = payload.sectors {
        company_model.sectors = Set(sectors);
    }
    if payload.size.is_some() {
        company_model.size = Set(payload.size);
    }
    if payload.location.is_some() {
        company_model.location = Set(payload.location);
    }
    if payload.website.is_some() {
        company_model.website = Set(payload.website);
    }
    if payload.phone.is_some() {
        company_model.phone = Set(payload.phone);
    }
    if payload.description.is_some() {
        company_model.description = Set(payload.description);
    }
    if payload.image.is_some() {
        company_model.image = Set(payload.image);
    }
    if let Some(password) = payload.password {
        let hashed_password = hash_password(&password).map_err(|_| ApiErr::PasswordHash)?;
        company_model.password = Set(hashed_password);
    }

    let current_company = repo_update_company(&db, company_model).await?;

    Ok(Json(RegisteredCompanyDto {
        status: "success".to_owned(),
        message: "Profile updated".to_owned(),
        company: current_company.into(),
    }))
}

/// Axum handler for viewing a company's public profile.
pub async fn get_company_profile(
    State(db): State<DatabaseConnection>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<CompanyProfileDto>, ApiErr> {
    let company = get_company_profile_by_id(&db, company_id)
        .await?
        .ok_or(ApiErr::CompanyNotExist)?;

    Ok(Json(CompanyProfileDto {
        status: "success".to_owned(),
        company,
    }))
}

/// Axum handler for the company directory.
pub async fn get_company_list(
    State(db): State<DatabaseConnection>,
) -> Result<Json<CompanyListDto>, ApiErr> {
    let companies = list_companies(&db).await?;

    Ok(Json(CompanyListDto {
        status: "success".to_owned(),
        companies,
    }))
}

/// Axum handler listing company profiles active in the provided sector.
pub async fn get_companies_in_sector(
    State(db): State<DatabaseConnection>,
    Path(sector): Path<String>,
) -> Result<Json<SectorCompaniesDto>, ApiErr> {
    let companies = get_companies_by_sector(&db, &sector).await?;

    Ok(Json(SectorCompaniesDto {
        status: "success".to_owned(),
        sector,
        companies,
    }))
}

/// Axum handler for company counters. Companies do not take part in the
/// follow graph yet, so every counter reads zero.
pub async fn get_company_counters(
    State(db): State<DatabaseConnection>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<CompanyCountersDto>, ApiErr> {
    get_company_profile_by_id(&db, company_id)
        .await?
        .ok_or(ApiErr::CompanyNotExist)?;

    Ok(Json(CompanyCountersDto {
        status: "success".to_owned(),
        company_id,
        following: 0,
        followed: 0,
        publications: 0,
    }))
}

/// Axum handler issuing a company password reset token, valid for one hour.
pub async fn request_company_password_reset(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CompanyPasswordResetRequestDto>,
) -> Result<Json<MessageDto>, ApiErr> {
    let company = get_company_by_email(&db, &payload.email)
        .await?
        .ok_or(ApiErr::CompanyNotExist)?;

    let reset_token = generate_account_token();
    let email = company.email.clone();

    let mut company_model: company::ActiveModel = company.into();
    company_model.reset_token = Set(Some(reset_token.clone()));
    company_model.reset_expires = Set(Some(chrono::Utc::now().naive_utc() + Duration::hours(1)));
    repo_update_company(&db, company_model).await?;

    tracing::info!("password reset token issued for {email}: {reset_token}");

    Ok(Json(MessageDto {
        status: "success".to_owned(),
        message: "Password reset email sent".to_owned(),
    }))
}

/// Axum handler completing a company password reset.
pub async fn reset_company_password(
    State(db): State<DatabaseConnection>,
    Path(token): Path<String>,
    Json(payload): Json<CompanyPasswordResetDto>,
) -> Result<Json<MessageDto>, ApiErr> {
    let company = get_company_by_reset_token(&db, &token)
        .await?
        .ok_or(ApiErr::InvalidToken)?;

    match company.reset_expires {
        Some(expires) if expires >= chrono::Utc::now().naive_utc() => {}
        Some(_) => return Err(ApiErr::TokenExpired),
        None => return Err(ApiErr::InvalidToken),
    }

    let hashed_password = hash_password(&payload.password).map_err(|_| ApiErr::PasswordHash)?;

    let mut company_model: company::ActiveModel = company.into();
    company_model.password = Set(hashed_password);
    company_model.reset_token = Set(None);
    company_model.reset_expires = Set(None);
    repo_update_company(&db, company_model).await?;

    Ok(Json(MessageDto {
        status: "success".to_owned(),
        message: "Password updated".to_owned(),
    }))
}

/// Company fields the owner may see about their own account.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CurrentCompany {
    pub id: Uuid,
    pub legal_id: String,
    pub name: String,
    pub email: String,
    pub sectors: String,
    pub size: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub verified: bool,
}

impl From<company::Model> for CurrentCompany {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            legal_id: model.legal_id,
            name: model.name,
            email: model.email,
            sectors: model.sectors,
            size: model.size,
            location: model.location,
            website: model.website,
            phone: model.phone,
            description: model.description,
            image: model.image,
            verified: model.verified,
        }
    }
}

/// Struct describing JSON object returned by registration and update.
#[derive(Debug, PartialEq, Serialize)]
pub struct RegisteredCompanyDto {
    pub status: String,
    pub message: String,
    pub company: CurrentCompany,
}

/// Struct describing JSON object returned on company login.
#[derive(Debug, PartialEq, Serialize)]
pub struct CompanyLoginDto {
    pub status: String,
    pub message: String,
    pub company: CurrentCompany,
    pub token: String,
    pub is_company: bool,
}

/// Struct describing JSON object with a single company profile.
#[derive(Debug, PartialEq, Serialize)]
pub struct CompanyProfileDto {
    pub status: String,
    pub company: CompanyProfile,
}

/// Struct describing JSON object with the company directory.
#[derive(Debug, PartialEq, Serialize)]
pub struct CompanyListDto {
    pub status: String,
    pub companies: Vec<CompanySummary>,
}

/// Struct describing JSON object with companies of a sector.
#[derive(Debug, PartialEq, Serialize)]
pub struct SectorCompaniesDto {
    pub status: String,
    pub sector: String,
    pub companies: Vec<CompanyProfile>,
}

/// Struct describing JSON object with company counters.
#[derive(Debug, PartialEq, Serialize)]
pub struct CompanyCountersDto {
    pub status: String,
    pub company_id: Uuid,
    pub following: u64,
    pub followed: u64,
    pub publications: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterCompanyDto {
    pub legal_id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub sectors: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginCompanyDto {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCompanyDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub sectors: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CompanyPasswordResetRequestDto {
    pub email: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CompanyPasswordResetDto {
    pub password: String,
}

#[cfg(test)]
mod test_register_company {
    use super::{register_company, RegisterCompanyDto};
    use crate::api::error::ApiErr;
    use crate::repo::company::get_company_by_email;
    use crate::tests::{
        Operation::{Insert, Migration},
        TestData, TestDataBuilder, TestErr,
    };
    use axum::{extract::State, Json};

    #[tokio::test]
    async fn register_new_company() -> Result<(), TestErr> {
        let (connection, _) = TestDataBuilder::new()
            .companies(Migration)
            .build()
            .await?;
        let payload = RegisterCompanyDto {
            legal_id: "B-00000099".to_owned(),
            name: "Acme".to_owned(),
            email: "acme@example.com".to_owned(),
            password: "password99".to_owned(),
            sectors: "manufacturing".to_owned(),
        };

        let result = register_company(State(connection.clone()), Json(payload)).await?;
        let Json(result) = result;

        assert_eq!(result.status, "success");
        assert!(!result.company.verified);

        let stored = get_company_by_email(&connection, "acme@example.com")
            .await
            .map_err(ApiErr::Db)?
            .unwrap();
        assert!(stored.verification_token.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn register_duplicate_legal_id() -> Result<(), TestErr> {
        let (connection, TestData { companies, .. }) =
            TestDataBuilder::new().companies(Insert(1)).build().await?;
        let existing = &companies.unwrap()[0];
        let payload = RegisterCompanyDto {
            legal_id: existing.legal_id.clone(),
            name: "Other".to_owned(),
            email: "other@example.com".to_owned(),
            password: "password99".to_owned(),
            sectors: "retail".to_owned(),
        };

        let result = register_company(State(connection), Json(payload)).await;

        assert_eq!(result.err(), Some(ApiErr::CompanyExist));

        Ok(())
    }
}


#[cfg(test)]
mod test_login_company {
    use super::{login_company, register_company, LoginCompanyDto, RegisterCompanyDto};
    use crate::api::error::ApiErr;
    use crate::tests::{Operation::Migration, TestDataBuilder, TestErr};
    use axum::{extract::State, Json};
    use serial_test::serial;
    use std::env;

    #[tokio::test]
    #[serial]
    async fn login_roundtrip() -> Result<(), TestErr> {
        env::set_var("SECRET_KEY", "secret-for-tests");
        let (connection, _) = TestDataBuilder::new()
            .companies(Migration)
            .build()
            .await?;
        let payload = RegisterCompanyDto {
            legal_id: "B-00000099".to_owned(),
            name: "Acme".to_owned(),
            email: "acme@example.com".to_owned(),
            password: "password99".to_owned(),
            sectors: "manufacturing".to_owned(),
        };
        register_company(State(connection.clone()), Json(payload)).await?;

        let result = login_company(
            State(connection),
            Json(LoginCompanyDto {
                email: "acme@example.com".to_owned(),
                password: "password99".to_owned(),
            }),
        )
        .await?;
        let Json(result) = result;

        assert_eq!(result.status, "success");
        assert!(result.is_company);
        assert!(!result.token.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn login_wrong_password() -> Result<(), TestErr> {
        let (connection, _) = TestDataBuilder::new()
            .companies(Migration)
            .build()
            .await?;
        let payload = RegisterCompanyDto {
            legal_id: "B-00000099".to_owned(),
            name: "Acme".to_owned(),
            email: "acme@example.com".to_owned(),
            password: "password99".to_owned(),
            sectors: "manufacturing".to_owned(),
        };
        register_company(State(connection.clone()), Json(payload)).await?;

        let result = login_company(
            State(connection),
            Json(LoginCompanyDto {
                email: "acme@example.com".to_owned(),
                password: "wrong".to_owned(),
            }),
        )
        .await;

        assert_eq!(result.err(), Some(ApiErr::WrongPassword));

        Ok(())
    }
}

#[cfg(test)]
mod test_company_directory {
    use super::{get_companies_in_sector, get_company_counters, get_company_list};
    use crate::api::error::ApiErr;
    use crate::tests::{Operation::Insert, TestData, TestDataBuilder, TestErr};
    use axum::{
        extract::{Path, State},
        Json,
    };
    use uuid::Uuid;

    #[tokio::test]
    async fn directory_lists_all() -> Result<(), TestErr> {
        let (connection, _) = TestDataBuilder::new().companies(Insert(3)).build().await?;

        let result = get_company_list(State(connection)).await?;
        let Json(result) = result;

        assert_eq!(result.companies.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn sector_filter() -> Result<(), TestErr> {
        let (connection, _) = TestDataBuilder::new().companies(Insert(3)).build().await?;

        let result =
            get_companies_in_sector(State(connection.clone()), Path("technology".to_owned()))
                .await?;
        let Json(result) = result;
        assert_eq!(result.companies.len(), 3);
        assert_eq!(result.sector, "technology");

        let Json(empty) =
            get_companies_in_sector(State(connection), Path("farming".to_owned())).await?;
        assert!(empty.companies.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn counters_are_zero() -> Result<(), TestErr> {
        let (connection, TestData { companies, .. }) =
            TestDataBuilder::new().companies(Insert(1)).build().await?;
        let company_id = companies.unwrap()[0].id;

        let result = get_company_counters(State(connection), Path(company_id)).await?;
        let Json(result) = result;

        assert_eq!(result.following, 0);
        assert_eq!(result.followed, 0);
        assert_eq!(result.publications, 0);

        Ok(())
    }

    #[tokio::test]
    async fn counters_for_missing_company() -> Result<(), TestErr> {
        let (connection, _) = TestDataBuilder::new().companies(Insert(1)).build().await?;

        let result = get_company_counters(State(connection), Path(Uuid::new_v4())).await;

        assert_eq!(result.err(), Some(ApiErr::CompanyNotExist));

        Ok(())
    }
}
