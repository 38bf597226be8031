//! End-to-end service flows against a real Postgres. Run with
//! `DATABASE_URL=... cargo test -- --ignored`.

use std::env;
use uuid::Uuid;

use landlord_api::{
    error::ServiceError,
    model::AccountContext,
    service::{
        auth::RegisterInput,
        fields::NumberInput,
        properties::{CreatePropertyInput, UpdatePropertyInput},
        tenants::{CreateTenantInput, UpdateTenantInput},
    },
    state::AppState,
};

fn database_configured() -> bool {
    dotenvy::dotenv().ok();
    matches!(env::var("DATABASE_URL"), Ok(value) if !value.trim().is_empty())
}

async fn fresh_account(state: &AppState) -> Result<AccountContext, Box<dyn std::error::Error>> {
    let output = state
        .auth()
        .register(RegisterInput {
            email: format!("landlord-{}@example.com", Uuid::new_v4().simple()),
            password: "long-enough-password".to_string(),
            full_name: Some("Test Landlord".to_string()),
        })
        .await?;
    Ok(AccountContext {
        account_id: output.account.id,
        account_uid: output.account.uid,
    })
}

fn property_input(name: &str, units: &str) -> CreatePropertyInput {
    CreatePropertyInput {
        name: name.to_string(),
        address: "12 Admiralty Way".to_string(),
        property_type: "apartment".to_string(),
        units: NumberInput::from(units),
        annual_rent_per_unit: NumberInput::from(1_200_000.0),
        description: None,
        status: None,
    }
}

fn tenant_input(property: Uuid, unit: Uuid, name: &str) -> CreateTenantInput {
    CreateTenantInput {
        property,
        unit,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "0803 000 0000".to_string(),
        annual_rent: NumberInput::from("1200000"),
        lease_start: None,
        lease_end: None,
        rent_due_day: None,
    }
}

#[tokio::test]
#[ignore]
async fn free_plan_caps_properties_at_two() -> Result<(), Box<dyn std::error::Error>> {
    if !database_configured() {
        return Ok(());
    }
    let state = AppState::new().await.map_err(|err| err.to_string())?;
    let ctx = fresh_account(&state).await?;

    let snapshot = state.subscriptions().snapshot(&ctx).await;
    assert!(snapshot.gate.is_free_plan());
    assert!(snapshot.gate.can_add_property());

    state.properties().create(&ctx, property_input("One", "1")).await?;
    state.properties().create(&ctx, property_input("Two", "1")).await?;

    let denied = state.properties().create(&ctx, property_input("Three", "1")).await;
    assert!(matches!(denied, Err(ServiceError::PlanLimitReached)));

    state.subscriptions().change_plan(&ctx, "Premium").await?;
    let snapshot = state.subscriptions().snapshot(&ctx).await;
    assert!(snapshot.gate.is_premium());
    state.properties().create(&ctx, property_input("Three", "1")).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn tenant_assignment_occupies_and_releases_units() -> Result<(), Box<dyn std::error::Error>> {
    if !database_configured() {
        return Ok(());
    }
    let state = AppState::new().await.map_err(|err| err.to_string())?;
    let ctx = fresh_account(&state).await?;

    let property = state.properties().create(&ctx, property_input("Court", "3")).await?;
    let property_uid = property.property.uid;
    let unit_numbers: Vec<&str> = property
        .units
        .iter()
        .map(|unit| unit.unit_number.as_str())
        .collect();
    assert_eq!(unit_numbers, ["1", "2", "3"]);
    let first_unit = property.units[0].uid;
    let second_unit = property.units[1].uid;

    let tenant = state
        .tenants()
        .create(&ctx, tenant_input(property_uid, first_unit, "Amaka"))
        .await?;
    assert_eq!(tenant.tenant.monthly_rent, 100_000.0);
    assert_eq!(tenant.tenant.payment_status, "due");

    let clash = state
        .tenants()
        .create(&ctx, tenant_input(property_uid, first_unit, "Bola"))
        .await;
    assert!(matches!(
        clash,
        Err(ServiceError::Conflict { code: "unit_occupied", .. })
    ));

    let vacancies = state.vacancies().for_property(&ctx, property_uid, None).await?;
    let vacant: Vec<&str> = vacancies.units.iter().map(|u| u.unit_number.as_str()).collect();
    assert_eq!(vacant, ["2", "3"]);

    let editing = state
        .vacancies()
        .for_property(&ctx, property_uid, Some(tenant.tenant.uid))
        .await?;
    let selectable: Vec<&str> = editing.units.iter().map(|u| u.unit_number.as_str()).collect();
    assert_eq!(selectable, ["1", "2", "3"]);

    // Shrinking below the occupied count is refused; shrinking to it is not.
    let too_small = state
        .properties()
        .update(
            &ctx,
            property_uid,
            UpdatePropertyInput {
                units: Some(NumberInput::from(0.0)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(too_small, Err(ServiceError::Conflict { .. })));

    state
        .tenants()
        .update(
            &ctx,
            tenant.tenant.uid,
            UpdateTenantInput {
                unit: Some(second_unit),
                ..Default::default()
            },
        )
        .await?;
    let vacancies = state.vacancies().for_property(&ctx, property_uid, None).await?;
    let vacant: Vec<&str> = vacancies.units.iter().map(|u| u.unit_number.as_str()).collect();
    assert_eq!(vacant, ["1", "3"]);

    let refused = state.properties().delete(&ctx, property_uid).await;
    assert!(matches!(
        refused,
        Err(ServiceError::Conflict { code: "property_has_tenants", .. })
    ));

    state.tenants().delete(&ctx, tenant.tenant.uid).await?;
    let view = state.properties().get(&ctx, property_uid).await?;
    assert_eq!(view.occupied_units, 0);
    state.properties().delete(&ctx, property_uid).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn shrinking_after_tenant_removal_drops_freed_unit() -> Result<(), Box<dyn std::error::Error>>
{
    if !database_configured() {
        return Ok(());
    }
    let state = AppState::new().await.map_err(|err| err.to_string())?;
    let ctx = fresh_account(&state).await?;

    let property = state.properties().create(&ctx, property_input("Annex", "3")).await?;
    let property_uid = property.property.uid;
    let third_unit = property.units[2].uid;

    let tenant = state
        .tenants()
        .create(&ctx, tenant_input(property_uid, third_unit, "Chidi"))
        .await?;
    state.tenants().delete(&ctx, tenant.tenant.uid).await?;

    let view = state
        .properties()
        .update(
            &ctx,
            property_uid,
            UpdatePropertyInput {
                units: Some(NumberInput::from("2")),
                ..Default::default()
            },
        )
        .await?;
    let remaining: Vec<&str> = view.units.iter().map(|u| u.unit_number.as_str()).collect();
    assert_eq!(remaining, ["1", "2"]);
    assert_eq!(view.property.unit_count, 2);

    let oversized = state
        .properties()
        .update(
            &ctx,
            property_uid,
            UpdatePropertyInput {
                units: Some(NumberInput::from("20000")),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(oversized, Err(ServiceError::Validation(_))));

    state.properties().delete(&ctx, property_uid).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn moving_tenant_between_properties() -> Result<(), Box<dyn std::error::Error>> {
    if !database_configured() {
        return Ok(());
    }
    let state = AppState::new().await.map_err(|err| err.to_string())?;
    let ctx = fresh_account(&state).await?;

    let first = state.properties().create(&ctx, property_input("First", "2")).await?;
    let second = state.properties().create(&ctx, property_input("Second", "2")).await?;
    let (first_uid, second_uid) = (first.property.uid, second.property.uid);

    let tenant = state
        .tenants()
        .create(&ctx, tenant_input(first_uid, first.units[0].uid, "Dayo"))
        .await?;
    let tenant_uid = tenant.tenant.uid;

    let missing_unit = state
        .tenants()
        .update(
            &ctx,
            tenant_uid,
            UpdateTenantInput {
                property: Some(second_uid),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(missing_unit, Err(ServiceError::Validation(_))));

    let moved = state
        .tenants()
        .update(
            &ctx,
            tenant_uid,
            UpdateTenantInput {
                property: Some(second_uid),
                unit: Some(second.units[1].uid),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(moved.property_uid, Some(second_uid));
    assert_eq!(moved.unit_number.as_deref(), Some("2"));

    let old = state.vacancies().for_property(&ctx, first_uid, None).await?;
    let vacant: Vec<&str> = old.units.iter().map(|u| u.unit_number.as_str()).collect();
    assert_eq!(vacant, ["1", "2"]);

    let new = state.vacancies().for_property(&ctx, second_uid, None).await?;
    let vacant: Vec<&str> = new.units.iter().map(|u| u.unit_number.as_str()).collect();
    assert_eq!(vacant, ["1"]);

    let editing = state
        .vacancies()
        .for_property(&ctx, second_uid, Some(tenant_uid))
        .await?;
    let selectable: Vec<&str> = editing.units.iter().map(|u| u.unit_number.as_str()).collect();
    assert_eq!(selectable, ["1", "2"]);

    state.tenants().delete(&ctx, tenant_uid).await?;
    state.properties().delete(&ctx, first_uid).await?;
    state.properties().delete(&ctx, second_uid).await?;
    Ok(())
}
