use async_trait::async_trait;
use collection_core_api::domain::duplicate::IdentityRow;
use collection_core_db::models::record::customer_record::IDENTITY_FIELDS;
use collection_core_db::repository::find_duplicates::FindDuplicates;
use sqlx::{Postgres, QueryBuilder, Row};
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl RecordRepositoryImpl {
    pub(super) async fn find_duplicates_impl(
        &self,
        candidate: &[(&'static str, Option<String>)],
        exclude_id: Option<i64>,
    ) -> Result<Vec<IdentityRow>, Box<dyn Error + Send + Sync>> {
        let present: Vec<(&'static str, &str)> = candidate
            .iter()
            .filter_map(|(field, value)| {
                let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
                Some((*field, value))
            })
            .collect();
        if present.is_empty() {
            return Ok(Vec::new());
        }
        for (field, _) in &present {
            if !IDENTITY_FIELDS.contains(field) {
                return Err(format!("'{field}' is not an identity column").into());
            }
        }

        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT id, record_uid, customer_name, mobile, alt_mobile1, alt_mobile2, \
             alt_mobile3, alt_mobile4, alt_mobile5, alt_mobile6, alt_mobile7, email, crn, \
             loan_card_no FROM customer_record WHERE (",
        );
        for (n, (field, value)) in present.iter().enumerate() {
            if n > 0 {
                query.push(" OR ");
            }
            query.push(*field);
            query.push(" = ");
            query.push_bind(value.to_string());
        }
        query.push(")");
        if let Some(id) = exclude_id {
            query.push(" AND id != ");
            query.push_bind(id);
        }

        let rows = {
            let mut tx = self.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            query.build().fetch_all(&mut **transaction).await?
        };

        let mut identity_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values: Vec<(&'static str, Option<String>)> = Vec::with_capacity(IDENTITY_FIELDS.len());
            for field in IDENTITY_FIELDS {
                values.push((field, row.try_get::<Option<String>, _>(*field)?));
            }
            identity_rows.push(IdentityRow {
                record_id: row.get("id"),
                record_uid: row.get("record_uid"),
                customer_name: row.try_get("customer_name")?,
                values,
            });
        }
        Ok(identity_rows)
    }
}

#[async_trait]
impl FindDuplicates<Postgres> for RecordRepositoryImpl {
    async fn find_duplicates(
        &self,
        candidate: &[(&'static str, Option<String>)],
        exclude_id: Option<i64>,
    ) -> Result<Vec<IdentityRow>, Box<dyn Error + Send + Sync>> {
        Self::find_duplicates_impl(self, candidate, exclude_id).await
    }
}
