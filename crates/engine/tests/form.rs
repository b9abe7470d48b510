use chrono::NaiveDate;

use engine::{
    BudgetEntry, CatalogItem, CatalogSnapshot, ExistingTransaction, FormError, FormState,
    MoneyCents, PortfolioDirection, SPLIT_CATEGORY, SplitPart, TRANSFER_CATEGORY,
    install_categories,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
}

fn catalogs() -> CatalogSnapshot {
    CatalogSnapshot {
        accounts: vec![
            CatalogItem::new(1, "Cuenta corriente"),
            CatalogItem::new(2, "Ahorros banco"),
        ],
        types: vec![
            CatalogItem::new(10, "Ingreso"),
            CatalogItem::new(20, "Gasto"),
            CatalogItem::new(30, "Ahorro programado"),
            CatalogItem::new(40, "Pago de deuda"),
            CatalogItem::new(50, "Transferencia interna"),
            CatalogItem::new(60, "Portafolio de inversión"),
        ],
        categories: vec!["Supermercado".into(), "Transporte".into(), "Hogar".into()],
        goals: vec![CatalogItem::new(100, "Vacaciones")],
        debts: vec![CatalogItem::new(200, "Tarjeta de crédito")],
        budget_entries: vec![BudgetEntry {
            id: 300,
            category: "Supermercado".into(),
            type_label: "Gasto".into(),
            goal_id: None,
            debt_id: None,
            planned: MoneyCents::new(500_00),
            actual: MoneyCents::new(120_00),
            remaining: MoneyCents::new(380_00),
            frequency: "mensual".into(),
        }],
        known_tags: vec!["hogar".into(), "viaje".into()],
    }
}

fn valid_expense(catalogs: &CatalogSnapshot) -> FormState {
    let mut form = FormState::new(today());
    form.set_type(20, catalogs, None);
    form.description = "Mercado semanal".into();
    form.amount_text = "1000.00".into();
    form.account_id = Some(1);
    form.category = Some("Supermercado".into());
    form
}

#[test]
fn split_rows_summing_to_total_submit_with_sentinel_category() {
    let catalogs = catalogs();
    let mut form = valid_expense(&catalogs);

    assert!(form.toggle_split(&catalogs));
    {
        let split = form.split.as_mut().unwrap();
        let first = split.rows()[0].local_id;
        split.row_mut(first).unwrap().category = "Supermercado".into();
        split.row_mut(first).unwrap().amount_text = "500.00".into();
        let second = split.add_row();
        split.row_mut(second).unwrap().category = "Transporte".into();
        split.row_mut(second).unwrap().amount_text = "500.00".into();
    }

    let draft = form.build_submission(&catalogs).unwrap();
    assert_eq!(draft.category, SPLIT_CATEGORY);
    assert_eq!(draft.splits.len(), 2);
    assert_eq!(
        draft.splits.iter().map(|part| part.amount.cents()).sum::<i64>(),
        100_000
    );
}

#[test]
fn split_mismatch_is_blocked_naming_the_difference() {
    let catalogs = catalogs();
    let mut form = valid_expense(&catalogs);

    assert!(form.toggle_split(&catalogs));
    {
        let split = form.split.as_mut().unwrap();
        let first = split.rows()[0].local_id;
        split.row_mut(first).unwrap().category = "Supermercado".into();
        split.row_mut(first).unwrap().amount_text = "500.00".into();
        let second = split.add_row();
        split.row_mut(second).unwrap().category = "Transporte".into();
        split.row_mut(second).unwrap().amount_text = "499.00".into();
    }

    let err = form.build_submission(&catalogs).unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, FormError::SplitMismatch(_)), "{message}");
    assert!(message.contains("1.00"), "{message}");
}

#[test]
fn tag_set_never_holds_equivalent_entries() {
    let catalogs = catalogs();
    let mut form = valid_expense(&catalogs);

    form.tag_input = "#Hogar".into();
    assert!(form.commit_tag_input());
    form.tag_input = "hogar".into();
    assert!(!form.commit_tag_input());
    form.tag_input = " HOGAR ".into();
    assert!(!form.commit_tag_input());
    form.tag_input = "viaje".into();
    assert!(form.commit_tag_input());

    assert_eq!(form.tags.labels(), ["Hogar", "viaje"]);

    // Backspace on an empty input pops the most recent tag.
    form.tag_backspace();
    assert_eq!(form.tags.labels(), ["Hogar"]);
}

#[test]
fn unchanged_edit_is_blocked_before_any_assembly() {
    let catalogs = catalogs();
    let existing = persisted_expense();
    let form = FormState::edit(existing, today());

    assert!(!form.has_changes());
    assert_eq!(
        form.build_submission(&catalogs).unwrap_err(),
        FormError::NoChanges
    );
}

#[test]
fn reordered_tags_and_splits_still_count_as_unchanged() {
    let catalogs = catalogs();
    let mut existing = persisted_expense();
    existing.splits = vec![
        SplitPart {
            category: "Supermercado".into(),
            amount: MoneyCents::new(60_000),
        },
        SplitPart {
            category: "Transporte".into(),
            amount: MoneyCents::new(40_000),
        },
    ];
    let mut form = FormState::edit(existing, today());

    // Same tags in a different order; same splits typed the other way around.
    form.tags.remove("pareja");
    form.tags.pop();
    form.tag_input = "mensual".into();
    form.commit_tag_input();
    form.tag_input = "#Pareja".into();
    form.commit_tag_input();

    let split = form.split.as_mut().unwrap();
    let rows: Vec<u64> = split.rows().iter().map(|r| r.local_id).collect();
    split.row_mut(rows[0]).unwrap().category = "Transporte".into();
    split.row_mut(rows[0]).unwrap().amount_text = "400".into();
    split.row_mut(rows[1]).unwrap().category = "Supermercado".into();
    split.row_mut(rows[1]).unwrap().amount_text = "600,00".into();

    assert!(!form.has_changes());
    assert_eq!(
        form.build_submission(&catalogs).unwrap_err(),
        FormError::NoChanges
    );

    form.description.push_str(" (ajustado)");
    assert!(form.has_changes());
}

#[test]
fn loading_and_assembling_round_trips_canonical_fields() {
    let catalogs = catalogs();
    let existing = persisted_expense();
    let form = FormState::edit(existing.clone(), today());

    let draft = form.assemble(&catalogs).unwrap();
    assert_eq!(draft.description, existing.description);
    assert_eq!(draft.amount, existing.amount);
    assert_eq!(draft.date, existing.date);
    assert_eq!(draft.account_id, 1);
    assert_eq!(draft.type_label, "Gasto");
    assert_eq!(draft.category, "Supermercado");
    assert_eq!(draft.goal_id, existing.goal_id);
    assert_eq!(draft.debt_id, existing.debt_id);
    assert!(!draft.is_transfer);
    assert_eq!(draft.tags, existing.tags);
    assert_eq!(draft.splits, existing.splits);
}

#[test]
fn savings_type_with_no_goals_advises_without_blocking() {
    let mut catalogs = catalogs();
    catalogs.goals.clear();
    let mut form = FormState::new(today());

    let change = form.set_type(30, &catalogs, None);
    let advisory = change.advisory.unwrap();
    assert!(advisory.contains("crear una meta"), "{advisory}");
    // The selection itself stands; only submission requires the goal.
    assert_eq!(form.type_id, Some(30));
    assert_eq!(change.fetch_categories, Some(30));
}

#[test]
fn savings_type_requires_goal_at_submit() {
    let catalogs = catalogs();
    let mut form = FormState::new(today());
    form.set_type(30, &catalogs, None);
    form.description = "Aporte mensual".into();
    form.amount_text = "250".into();
    form.account_id = Some(1);
    form.category = Some("Hogar".into());

    assert_eq!(form.assemble(&catalogs).unwrap_err(), FormError::MissingGoal);

    form.goal_id = Some(100);
    assert!(form.assemble(&catalogs).is_ok());
}

#[test]
fn budget_entry_with_matching_type_cascades_type_and_category() {
    let catalogs = catalogs();
    let mut form = FormState::new(today());

    let entry = catalogs.budget_entry(300).unwrap().clone();
    let change = form.link_budget(&entry, &catalogs);

    assert_eq!(form.type_id, Some(20));
    assert_eq!(form.category.as_deref(), Some("Supermercado"));
    assert!(form.category_from_budget);
    assert_eq!(change.fetch_categories, Some(20));
    assert_eq!(change.category_override.as_deref(), Some("Supermercado"));
}

#[test]
fn budget_entry_without_matching_type_only_overrides_category() {
    let catalogs = catalogs();
    let mut form = FormState::new(today());
    form.set_type(10, &catalogs, None);

    let entry = BudgetEntry {
        id: 301,
        category: "Colegiaturas".into(),
        type_label: "Tipo retirado".into(),
        goal_id: Some(100),
        debt_id: None,
        planned: MoneyCents::new(300_00),
        actual: MoneyCents::ZERO,
        remaining: MoneyCents::new(300_00),
        frequency: "mensual".into(),
    };
    let change = form.link_budget(&entry, &catalogs);

    assert_eq!(form.type_id, Some(10), "type selection untouched");
    assert_eq!(form.category.as_deref(), Some("Colegiaturas"));
    assert!(form.category_from_budget);
    assert_eq!(form.goal_id, Some(100), "goal declared by the entry carries over");
    assert_eq!(change, Default::default());

    form.unlink_budget();
    assert_eq!(form.budget_entry_id, None);
    assert_eq!(form.category.as_deref(), Some("Colegiaturas"));
    assert!(!form.category_from_budget);
}

#[test]
fn transfer_type_forces_sentinel_and_turns_split_off() {
    let catalogs = catalogs();
    let mut form = valid_expense(&catalogs);
    assert!(form.toggle_split(&catalogs));

    let change = form.set_type(50, &catalogs, None);

    assert!(form.is_transfer);
    assert!(form.split.is_none());
    assert_eq!(form.category.as_deref(), Some(TRANSFER_CATEGORY));
    assert!(change.clear_categories);
    assert_eq!(change.fetch_categories, None);

    // Split mode cannot be re-entered while the type is a transfer.
    assert!(!form.toggle_split(&catalogs));
}

#[test]
fn transfer_requires_a_distinct_destination() {
    let catalogs = catalogs();
    let mut form = FormState::new(today());
    form.set_type(50, &catalogs, None);
    form.description = "Paso a ahorros".into();
    form.amount_text = "300".into();
    form.account_id = Some(1);

    assert_eq!(
        form.assemble(&catalogs).unwrap_err(),
        FormError::MissingTransferAccount
    );

    form.transfer_account_id = Some(1);
    assert_eq!(
        form.assemble(&catalogs).unwrap_err(),
        FormError::SameTransferAccount
    );

    form.transfer_account_id = Some(2);
    let draft = form.assemble(&catalogs).unwrap();
    assert_eq!(draft.category, TRANSFER_CATEGORY);
    assert_eq!(draft.transfer_account_id, Some(2));
}

#[test]
fn portfolio_type_requires_a_direction() {
    let catalogs = catalogs();
    let mut form = FormState::new(today());
    form.set_type(60, &catalogs, None);
    form.description = "Compra de ETF".into();
    form.amount_text = "1500".into();
    form.account_id = Some(1);
    form.category = Some("Hogar".into());

    assert_eq!(
        form.assemble(&catalogs).unwrap_err(),
        FormError::MissingDirection
    );

    form.portfolio_direction = Some(PortfolioDirection::Compra);
    let draft = form.assemble(&catalogs).unwrap();
    assert_eq!(draft.portfolio_direction, Some(PortfolioDirection::Compra));
}

#[test]
fn blocking_checks_follow_the_documented_order() {
    let catalogs = catalogs();
    let mut form = FormState::new(today());

    assert_eq!(form.assemble(&catalogs).unwrap_err(), FormError::MissingType);

    form.set_type(20, &catalogs, None);
    assert_eq!(form.assemble(&catalogs).unwrap_err(), FormError::InvalidAmount);

    form.amount_text = "100".into();
    form.date_text = "no es fecha".into();
    assert_eq!(form.assemble(&catalogs).unwrap_err(), FormError::InvalidDate);

    form.date_text = "2026-03-11".into();
    assert_eq!(form.assemble(&catalogs).unwrap_err(), FormError::FutureDate);

    form.date_text = "2026-03-10".into();
    assert_eq!(form.assemble(&catalogs).unwrap_err(), FormError::MissingAccount);

    form.account_id = Some(1);
    assert_eq!(form.assemble(&catalogs).unwrap_err(), FormError::MissingCategory);

    form.category = Some("Hogar".into());
    assert!(form.assemble(&catalogs).is_ok());
}

#[test]
fn synthetic_category_keeps_budget_override_valid() {
    let mut catalogs = catalogs();
    let mut form = FormState::new(today());
    let entry = catalogs.budget_entry(300).unwrap().clone();
    let change = form.link_budget(&entry, &catalogs);

    // The backend's list for the new type does not carry the override.
    install_categories(
        &mut catalogs,
        vec!["Transporte".into(), "Hogar".into()],
        change.category_override.as_deref(),
    );

    assert!(catalogs.categories.iter().any(|c| c == "Supermercado"));
}

fn persisted_expense() -> ExistingTransaction {
    ExistingTransaction {
        description: "Mercado semanal".into(),
        amount: MoneyCents::new(100_000),
        date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        type_id: Some(20),
        category: Some("Supermercado".into()),
        account_id: Some(1),
        goal_id: None,
        debt_id: None,
        budget_entry_id: None,
        is_transfer: false,
        transfer_account_id: None,
        portfolio_direction: None,
        splits: Vec::new(),
        tags: vec!["pareja".into(), "mensual".into()],
        receipts: Vec::new(),
    }
}
