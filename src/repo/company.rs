use entity::entities::{company, prelude::Company};
use sea_orm::{
    prelude::Uuid, query::*, ColumnTrait, Condition, DatabaseConnection, DbErr, DeleteResult,
    EntityTrait, FromQueryResult, InsertResult, QueryFilter,
};
use serde::Serialize;

/// Fetch `company` for the provided `email`.
/// Returns optional `company` on success, otherwise returns an `database error`.
pub async fn get_company_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<company::Model>, DbErr> {
    Company::find()
        .filter(company::Column::Email.eq(email))
        .one(db)
        .await
}

/// Fetch `company` for the provided `id`.
/// Returns optional `company` on success, otherwise returns an `database error`.
pub async fn get_company_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<company::Model>, DbErr> {
    Company::find_by_id(id).one(db).await
}

/// Duplicate check used at registration: a company already exists when either
/// the email or the legal id matches.
pub async fn get_company_by_email_or_legal_id(
    db: &DatabaseConnection,
    email: &str,
    legal_id: &str,
) -> Result<Option<company::Model>, DbErr> {
    Company::find()
        .filter(
            Condition::any()
                .add(company::Column::Email.eq(email))
                .add(company::Column::LegalId.eq(legal_id)),
        )
        .one(db)
        .await
}

/// Fetch `company` holding the provided email verification token.
pub async fn get_company_by_verification_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<company::Model>, DbErr> {
    Company::find()
        .filter(company::Column::VerificationToken.eq(token))
        .one(db)
        .await
}

/// Fetch `company` holding the provided password reset token.
pub async fn get_company_by_reset_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<company::Model>, DbErr> {
    Company::find()
        .filter(company::Column::ResetToken.eq(token))
        .one(db)
        .await
}

/// Insert `company` for the provided `ActiveModel`.
/// Returns `InsertResult` with last inserted id on success, otherwise
/// returns an `database error`.
pub async fn create_company(
    db: &DatabaseConnection,
    company: company::ActiveModel,
) -> Result<InsertResult<company::ActiveModel>, DbErr> {
    Company::insert(company).exec(db).await
}

/// Update `company` for the provided `ActiveModel`.
/// Returns `company` on success, otherwise returns an `database error`.
pub async fn update_company(
    db: &DatabaseConnection,
    company: company::ActiveModel,
) -> Result<company::Model, DbErr> {
    Company::update(company).exec(db).await
}

/// Fetch the public company profile (no password or tokens) for the provided id.
pub async fn get_company_profile_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<CompanyProfile>, DbErr> {
    Company::find_by_id(id)
        .into_model::<CompanyProfile>()
        .one(db)
        .await
}

/// Fetch the name/sectors summary of every registered company.
/// Returns vec of `summaries` on success, otherwise returns an `database error`.
pub async fn list_companies(db: &DatabaseConnection) -> Result<Vec<CompanySummary>, DbErr> {
    Company::find()
        .order_by_asc(company::Column::Name)
        .into_model::<CompanySummary>()
        .all(db)
        .await
}

/// Fetch public company profiles matching the provided sector.
pub async fn get_companies_by_sector(
    db: &DatabaseConnection,
    sector: &str,
) -> Result<Vec<CompanyProfile>, DbErr> {
    Company::find()
        .filter(company::Column::Sectors.contains(sector))
        .order_by_asc(company::Column::Name)
        .into_model::<CompanyProfile>()
        .all(db)
        .await
}

/// Delete all existing `company` records from database.
/// Returns `DeleteResult` with affected rows count on success, otherwise
/// returns an `database error`.
pub async fn empty_company_table(db: &DatabaseConnection) -> Result<DeleteResult, DbErr> {
    Company::delete_many().exec(db).await
}

/// Company fields safe to show to any reader.
#[derive(Clone, Debug, PartialEq, FromQueryResult, Eq, Serialize)]
pub struct CompanyProfile {
    pub id: Uuid,
    pub name: String,
    pub sectors: String,
    pub size: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Short listing row for the company directory.
#[derive(Clone, Debug, PartialEq, FromQueryResult, Eq, Serialize)]
pub struct CompanySummary {
    pub id: Uuid,
    pub name: String,
    pub sectors: String,
}


#[cfg(test)]
mod test_company_listings {
    use super::{get_companies_by_sector, list_companies};
    use crate::tests::{Operation::Insert, TestData, TestDataBuilder, TestErr};

    #[tokio::test]
    async fn directory_has_summary_rows() -> Result<(), TestErr> {
        let (connection, _) = TestDataBuilder::new().companies(Insert(3)).build().await?;

        let result = list_companies(&connection).await?;
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].name, "company1");

        Ok(())
    }

    #[tokio::test]
    async fn sector_filter() -> Result<(), TestErr> {
        let (connection, _) = TestDataBuilder::new().companies(Insert(2)).build().await?;

        let matching = get_companies_by_sector(&connection, "technology").await?;
        assert_eq!(matching.len(), 2);

        let missing = get_companies_by_sector(&connection, "farming").await?;
        assert!(missing.is_empty());

        Ok(())
    }
}
