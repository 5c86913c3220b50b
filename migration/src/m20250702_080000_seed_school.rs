use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20250701_090000_init::{Staff, Student};

const STAFF_COUNT: u128 = 20;
const STUDENT_COUNT: u128 = 50;
const ADMIN_ID: u128 = 12345;
/// Keeps student ids clear of staff ids
const STUDENT_OFFSET: u128 = 1 << 64;

const DESIGNATIONS: [&str; 4] = ["Class Teacher", "Subject Teacher", "Librarian", "Accountant"];
const CLASSES: [&str; 5] = ["Grade 1", "Grade 2", "Grade 3", "Grade 4", "Grade 5"];

fn seed_id(offset: u128, i: u128) -> SimpleExpr {
    Expr::val(format!("{:032x}", offset + i)).cast_as("uuid")
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let time = Expr::val("2025-07-02T08:00:00.000Z").cast_as("timestamptz");

        // Staff members log in with their number as both username and password
        for i in 1..=STAFF_COUNT {
            let username = i.to_string();
            let salary = rand::random_range(15_000..=60_000);

            let hashed_password = &sha2::Sha256::digest(format!("{}:{}", username, username))[..];

            manager
                .exec_stmt(Query::insert()
                    .into_table(Staff::Table)
                    .columns(["id", "created_at", "updated_at", "username", "password", "role", "full_name", "designation", "base_salary"])
                    .values_panic([
                        seed_id(0, i),
                        time.clone(),
                        time.clone(),
                        username.clone().into(),
                        hashed_password.into(),
                        Expr::val("staff").cast_as("role_type"),
                        format!("Staff {username}").into(),
                        DESIGNATIONS[i as usize % DESIGNATIONS.len()].into(),
                        salary.into(),
                    ])
                    .to_owned()
            ).await?;
        }

        let hashed_password = &sha2::Sha256::digest("admin:admin")[..];

        manager
            .exec_stmt(Query::insert()
                .into_table(Staff::Table)
                .columns(["id", "created_at", "updated_at", "username", "password", "role", "full_name", "designation", "base_salary"])
                .values_panic([
                    seed_id(ADMIN_ID, 0),
                    time.clone(),
                    time.clone(),
                    "admin".into(),
                    hashed_password.into(),
                    Expr::val("admin").cast_as("role_type"),
                    "School Administrator".into(),
                    "Administrator".into(),
                    0.into(),
                ])
                .to_owned()
        ).await?;

        for i in 1..=STUDENT_COUNT {
            manager
                .exec_stmt(Query::insert()
                    .into_table(Student::Table)
                    .columns(["id", "created_at", "updated_at", "full_name", "admission_number", "class_name"])
                    .values_panic([
                        seed_id(STUDENT_OFFSET, i),
                        time.clone(),
                        time.clone(),
                        format!("Student {i}").into(),
                        format!("ADM-2025-{i:03}").into(),
                        CLASSES[i as usize % CLASSES.len()].into(),
                    ])
                    .to_owned()
            ).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let staff_ids = (1..=STAFF_COUNT).map(|i| seed_id(0, i)).chain([seed_id(ADMIN_ID, 0)]);

        manager
            .exec_stmt(Query::delete()
                .from_table(Staff::Table)
                .and_where(Expr::col("id").is_in(staff_ids))
                .to_owned()
        ).await?;

        manager
            .exec_stmt(Query::delete()
                .from_table(Student::Table)
                .and_where(Expr::col("id").is_in((1..=STUDENT_COUNT).map(|i| seed_id(STUDENT_OFFSET, i))))
                .to_owned()
        ).await?;

        Ok(())
    }
}
