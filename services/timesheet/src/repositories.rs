//! Repositories for database operations

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{TimesheetError, TimesheetResult};
use crate::models::{
    Client, Location, NewClient, NewLocation, NewTechnician, Technician, UpdateClient,
    UpdateLocation, UpdateTechnician,
};

pub mod submission;
pub mod time_entry;

fn map_client(row: &PgRow) -> Client {
    Client {
        id: row.get("id"),
        name: row.get("name"),
        contact_email: row.get("contact_email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_location(row: &PgRow) -> Location {
    Location {
        id: row.get("id"),
        client_id: row.get("client_id"),
        name: row.get("name"),
        address: row.get("address"),
        contact_name: row.get("contact_name"),
        contact_email: row.get("contact_email"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_technician(row: &PgRow) -> Technician {
    Technician {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Client repository for database operations
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    /// Create a new client repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new client
    pub async fn create(&self, payload: &NewClient) -> TimesheetResult<Client> {
        let row = sqlx::query(
            r#"
            INSERT INTO clients (name, contact_email)
            VALUES ($1, $2)
            RETURNING id, name, contact_email, created_at, updated_at
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.contact_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_client(&row))
    }

    /// List all clients, alphabetically
    pub async fn list(&self) -> TimesheetResult<Vec<Client>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, contact_email, created_at, updated_at
            FROM clients
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_client).collect())
    }

    /// Find a client by ID
    pub async fn find_by_id(&self, id: Uuid) -> TimesheetResult<Option<Client>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, contact_email, created_at, updated_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_client))
    }

    /// Update a client; fields left out of the payload keep their values
    pub async fn update(&self, id: Uuid, payload: &UpdateClient) -> TimesheetResult<Client> {
        let row = sqlx::query(
            r#"
            UPDATE clients
            SET name = COALESCE($2, name),
                contact_email = COALESCE($3, contact_email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, contact_email, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.contact_email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TimesheetError::NotFound("client"))?;

        Ok(map_client(&row))
    }

    /// Delete a client
    pub async fn delete(&self, id: Uuid) -> TimesheetResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TimesheetError::NotFound("client"));
        }
        Ok(())
    }
}

/// Location repository for database operations
#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    /// Create a new location repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new location
    pub async fn create(&self, payload: &NewLocation) -> TimesheetResult<Location> {
        let row = sqlx::query(
            r#"
            INSERT INTO locations (client_id, name, address, contact_name, contact_email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, client_id, name, address, contact_name, contact_email,
                      created_at, updated_at
            "#,
        )
        .bind(payload.client_id)
        .bind(&payload.name)
        .bind(&payload.address)
        .bind(&payload.contact_name)
        .bind(&payload.contact_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_location(&row))
    }

    /// List locations, optionally restricted to one client
    pub async fn list(&self, client_id: Option<Uuid>) -> TimesheetResult<Vec<Location>> {
        let rows = match client_id {
            Some(client_id) => {
                sqlx::query(
                    r#"
                    SELECT id, client_id, name, address, contact_name, contact_email,
                           created_at, updated_at
                    FROM locations
                    WHERE client_id = $1
                    ORDER BY name ASC
                    "#,
                )
                .bind(client_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, client_id, name, address, contact_name, contact_email,
                           created_at, updated_at
                    FROM locations
                    ORDER BY name ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(map_location).collect())
    }

    /// Find a location by ID
    pub async fn find_by_id(&self, id: Uuid) -> TimesheetResult<Option<Location>> {
        let row = sqlx::query(
            r#"
            SELECT id, client_id, name, address, contact_name, contact_email,
                   created_at, updated_at
            FROM locations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_location))
    }

    /// Update a location; fields left out of the payload keep their values
    pub async fn update(&self, id: Uuid, payload: &UpdateLocation) -> TimesheetResult<Location> {
        let row = sqlx::query(
            r#"
            UPDATE locations
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                contact_name = COALESCE($4, contact_name),
                contact_email = COALESCE($5, contact_email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, client_id, name, address, contact_name, contact_email,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.address)
        .bind(&payload.contact_name)
        .bind(&payload.contact_email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TimesheetError::NotFound("location"))?;

        Ok(map_location(&row))
    }

    /// Delete a location
    pub async fn delete(&self, id: Uuid) -> TimesheetResult<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TimesheetError::NotFound("location"));
        }
        Ok(())
    }
}

/// Technician repository for database operations
#[derive(Clone)]
pub struct TechnicianRepository {
    pool: PgPool,
}

impl TechnicianRepository {
    /// Create a new technician repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new technician
    pub async fn create(&self, payload: &NewTechnician) -> TimesheetResult<Technician> {
        let row = sqlx::query(
            r#"
            INSERT INTO technicians (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, active, created_at, updated_at
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_technician(&row))
    }

    /// List all technicians, alphabetically
    pub async fn list(&self) -> TimesheetResult<Vec<Technician>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, active, created_at, updated_at
            FROM technicians
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_technician).collect())
    }

    /// Find a technician by ID
    pub async fn find_by_id(&self, id: Uuid) -> TimesheetResult<Option<Technician>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, active, created_at, updated_at
            FROM technicians
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_technician))
    }

    /// Update a technician; fields left out of the payload keep their values
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateTechnician,
    ) -> TimesheetResult<Technician> {
        let row = sqlx::query(
            r#"
            UPDATE technicians
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                active = COALESCE($4, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(payload.active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TimesheetError::NotFound("technician"))?;

        Ok(map_technician(&row))
    }

    /// Delete a technician
    pub async fn delete(&self, id: Uuid) -> TimesheetResult<()> {
        let result = sqlx::query("DELETE FROM technicians WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TimesheetError::NotFound("technician"));
        }
        Ok(())
    }
}
