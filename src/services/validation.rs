use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};

use crate::error::{CinemaError, CinemaResult, ValidationErrors};

pub const MAX_NAME_LENGTH: usize = 255;

/// Check a required text field: not blank and not longer than `max_len` characters.
pub fn check_text(errors: &mut ValidationErrors, field: &str, value: &str, max_len: Option<usize>) {
    if value.trim().is_empty() {
        errors.add(field, "This field may not be blank.");
        return;
    }

    if let Some(max_len) = max_len
        && value.chars().count() > max_len
    {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_len} characters."),
        );
    }
}

pub fn check_positive(errors: &mut ValidationErrors, field: &str, value: i32) {
    if value < 1 {
        errors.add(field, "Ensure this value is greater than or equal to 1.");
    }
}

pub fn invalid_pk_message(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Returns the ids from `ids` that have no row in `E`, in input order.
pub async fn missing_ids<E, C>(conn: &C, id_column: E::Column, ids: &[i64]) -> CinemaResult<Vec<i64>>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found: Vec<i64> = E::find()
        .select_only()
        .column(id_column)
        .filter(id_column.is_in(ids.iter().copied()))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(ids
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect())
}

/// Record a message for every id of `ids` that does not exist in `E`.
pub async fn check_ids_exist<E, C>(
    conn: &C,
    errors: &mut ValidationErrors,
    field: &str,
    id_column: E::Column,
    ids: &[i64],
) -> CinemaResult<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    for id in missing_ids::<E, C>(conn, id_column, ids).await? {
        errors.add(field, invalid_pk_message(id));
    }
    Ok(())
}

/// Parse a comma separated id list such as `1,2,3`.
pub fn parse_id_list(raw: &str) -> CinemaResult<Vec<i64>> {
    raw.split(',')
        .map(|part| {
            part.trim().parse::<i64>().map_err(|_| {
                CinemaError::BadRequest(format!(
                    "Invalid id list `{raw}`: expected comma separated integers"
                ))
            })
        })
        .collect()
}

/// Sorted copy of `ids` without duplicates.
pub fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
