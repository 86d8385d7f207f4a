use common::{ROLES_PIVOT, roles_model};
use warden::{
    HasRoles, RoleRef,
    prelude::Result,
    store::{Catalog, Relation, Store},
};

mod common;

#[tokio::test]
async fn pivot_table_comes_from_the_factory() {
    let (_, model) = roles_model();
    assert_eq!(model.pivot().table, ROLES_PIVOT);
    assert_eq!(model.pivot().related_key, "role_id");
}

#[tokio::test]
async fn can_assign_and_access_related_roles() -> Result<()> {
    let (store, model) = roles_model();
    let entity = model.entity(1);

    for i in 0..10 {
        entity.assign_role([format!("role-{i}")]).await?;
    }
    let role = store.role_catalog().first_or_create("role-11").await?;
    entity.assign_role([role]).await?;

    assert_eq!(entity.roles().load().await?.len(), 11);
    Ok(())
}

#[tokio::test]
async fn can_check_if_an_entity_has_a_role() -> Result<()> {
    let (store, model) = roles_model();
    let entity = model.entity(1);
    let role = store.role_catalog().first_or_create("role-2").await?;
    entity.assign_role(["role-1"]).await?;

    assert!(entity.has_role("role-1").await?);
    assert!(!entity.has_role(&role).await?);
    assert!(!entity.has_role("role-3").await?);
    Ok(())
}

#[tokio::test]
async fn can_check_if_an_entity_has_any_of_the_given_roles() -> Result<()> {
    let (store, model) = roles_model();
    let entity = model.entity(1);
    let role = store.role_catalog().first_or_create("role-2").await?;
    entity.assign_role(["role-1"]).await?;
    entity.assign_role([&role]).await?;

    assert!(entity.has_any_roles(["role-1", "role-2"]).await?);
    assert!(
        entity
            .has_any_roles([RoleRef::from(&role), RoleRef::from("role-3")])
            .await?
    );
    assert!(!entity.has_any_roles(["role-3", "role-4"]).await?);
    Ok(())
}

#[tokio::test]
async fn can_check_if_an_entity_has_all_of_the_given_roles() -> Result<()> {
    let (store, model) = roles_model();
    let entity = model.entity(1);
    let role = store.role_catalog().first_or_create("role-2").await?;
    entity.assign_role([RoleRef::from("role-1"), RoleRef::from(&role)]).await?;

    assert!(entity.has_all_roles(["role-1", "role-2"]).await?);
    assert!(!entity.has_all_roles(["role-1", "role-3"]).await?);
    assert!(!entity.has_all_roles(["role-3", "role-4"]).await?);
    Ok(())
}

#[tokio::test]
async fn empty_role_lists_are_vacuous() -> Result<()> {
    let (_, model) = roles_model();
    let entity = model.entity(1);
    entity.assign_role(["admin"]).await?;
    let none: Vec<RoleRef> = Vec::new();

    assert!(!entity.has_any_roles(none.clone()).await?);
    assert!(entity.has_all_roles(none).await?);
    Ok(())
}

#[tokio::test]
async fn assigning_the_same_role_twice_keeps_one_assignment() -> Result<()> {
    let (store, model) = roles_model();
    let entity = model.entity(1);
    let role = store.role_catalog().first_or_create("admin").await?;

    entity.assign_role([&role]).await?;
    entity.assign_role([&role]).await?;
    entity.assign_role(["admin"]).await?;

    assert_eq!(entity.get_role_names().await?, vec!["admin"]);
    assert_eq!(store.grant_count(ROLES_PIVOT).await, 1);
    Ok(())
}

#[tokio::test]
async fn can_sync_entity_roles() -> Result<()> {
    let (_, model) = roles_model();
    let entity = model.entity(1);
    entity.assign_role(["role-1", "role-2"]).await?;

    entity.sync_roles(["role-1", "role-3"]).await?;
    assert_eq!(entity.get_role_names().await?, vec!["role-1", "role-3"]);

    entity.sync_roles(Vec::<RoleRef>::new()).await?;
    assert!(entity.get_role_names().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn can_revoke_entity_roles() -> Result<()> {
    let (store, model) = roles_model();
    let entity = model.entity(1);
    entity.assign_role(["role-1", "role-2", "role-3"]).await?;

    entity.revoke_role("role-1").await?;
    let role = store
        .role_catalog()
        .find_by_name("role-3")
        .await?
        .expect("created by the assignment");
    entity.revoke_role(role).await?;

    assert_eq!(entity.get_role_names().await?, vec!["role-2"]);
    Ok(())
}

#[tokio::test]
async fn revoking_an_unknown_role_creates_it_and_changes_nothing_else() -> Result<()> {
    let (store, model) = roles_model();
    let entity = model.entity(1);
    entity.assign_role(["admin"]).await?;

    entity.revoke_role("ghost").await?;

    assert_eq!(entity.get_role_names().await?, vec!["admin"]);
    assert!(store.role_catalog().find_by_name("ghost").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn role_names_follow_role_id_order() -> Result<()> {
    let (store, model) = roles_model();
    let entity = model.entity(1);
    store.role_catalog().first_or_create("zeta").await?;
    store.role_catalog().first_or_create("alpha").await?;

    entity.assign_role(["alpha", "zeta"]).await?;

    assert_eq!(entity.get_role_names().await?, vec!["zeta", "alpha"]);
    Ok(())
}
