use super::*;

fn started_cars() -> Result<(Document, CascadingSelector)> {
    let mut doc = Document::from_html(CARS_HTML)?;
    let mut cascade = CascadingSelector::new(&doc, "make", "model", cars_table())?;
    cascade.start(&mut doc)?;
    Ok((doc, cascade))
}

#[test]
fn selecting_primary_index_shows_matching_group_in_order() -> Result<()> {
    let (mut doc, mut cascade) = started_cars()?;

    doc.select_index("#make", 0)?;
    doc.assert_options("#model", &["Ford", "BMW"])?;
    doc.select_index("#make", 1)?;
    doc.assert_options("#model", &["Toyota"])?;
    doc.select_index("#make", 0)?;
    doc.assert_options("#model", &["Ford", "BMW"])?;

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn repopulated_options_use_entry_as_value_and_label() -> Result<()> {
    let (mut doc, mut cascade) = started_cars()?;

    doc.select_index("#make", 0)?;
    assert_eq!(
        doc.options("#model")?,
        vec![SelectOption::same("Ford"), SelectOption::same("BMW")]
    );
    doc.assert_value("#model", "Ford")?;
    assert_eq!(doc.selected_index("#model")?, Some(0));

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn switching_selection_leaves_no_residual_options() -> Result<()> {
    let html = r#"
        <select id='main'>
          <option>a</option>
          <option>b</option>
        </select>
        <select id='sub'>
          <option value='stale-1'>stale 1</option>
          <optgroup label='old'>
            <option value='stale-2'>stale 2</option>
          </optgroup>
        </select>
        "#;
    let mut doc = Document::from_html(html)?;
    let table = OptionTable::new(vec![vec!["a1", "a2", "a3"], vec!["b1"]]);
    let mut cascade = CascadingSelector::new(&doc, "main", "sub", table)?;
    cascade.start(&mut doc)?;

    doc.select_index("#main", 0)?;
    doc.assert_options("#sub", &["a1", "a2", "a3"])?;
    doc.select_index("#main", 1)?;
    doc.assert_options("#sub", &["b1"])?;
    assert!(!doc.to_html().contains("stale"));

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn selecting_same_index_twice_is_idempotent() -> Result<()> {
    let (mut doc, mut cascade) = started_cars()?;

    doc.select_index("#make", 1)?;
    let first = doc.options("#model")?;
    doc.select_index("#make", 1)?;
    assert_eq!(doc.options("#model")?, first);
    doc.assert_options("#model", &["Toyota"])?;

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn empty_group_leaves_secondary_without_options() -> Result<()> {
    let html = r#"
        <select id='main'><option>none</option><option>one</option></select>
        <select id='sub'><option>left over</option></select>
        "#;
    let mut doc = Document::from_html(html)?;
    let table = OptionTable::new(vec![Vec::<String>::new(), vec!["X".to_string()]]);
    let mut cascade = CascadingSelector::new(&doc, "main", "sub", table)?;
    cascade.start(&mut doc)?;

    doc.select_index("#main", 0)?;
    doc.assert_options("#sub", &[])?;
    doc.assert_value("#sub", "")?;
    assert_eq!(doc.selected_index("#sub")?, None);

    doc.select_index("#main", 1)?;
    doc.assert_options("#sub", &["X"])?;

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn start_twice_installs_a_single_listener() -> Result<()> {
    let (mut doc, mut cascade) = started_cars()?;
    cascade.start(&mut doc)?;

    assert!(cascade.is_started());
    assert_eq!(doc.listener_count("#make", "change")?, 1);

    doc.select_index("#make", 0)?;
    doc.assert_options("#model", &["Ford", "BMW"])?;

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn dispose_stops_updates_and_allows_restart() -> Result<()> {
    let (mut doc, mut cascade) = started_cars()?;
    doc.select_index("#make", 1)?;

    assert!(cascade.dispose(&mut doc));
    assert!(!cascade.is_started());
    assert_eq!(doc.listener_count("#make", "change")?, 0);

    doc.select_index("#make", 0)?;
    doc.assert_options("#model", &["Toyota"])?;
    assert!(!cascade.dispose(&mut doc));

    cascade.start(&mut doc)?;
    doc.select_index("#make", 0)?;
    doc.assert_options("#model", &["Ford", "BMW"])?;

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn unknown_identifiers_fail_with_element_not_found() -> Result<()> {
    let doc = Document::from_html(CARS_HTML)?;

    match CascadingSelector::new(&doc, "maker", "model", cars_table()) {
        Err(Error::ElementNotFound(id)) => assert_eq!(id, "#maker"),
        other => panic!("expected ElementNotFound, got: {other:?}"),
    }
    match CascadingSelector::new(&doc, "make", "#models", cars_table()) {
        Err(Error::ElementNotFound(id)) => assert_eq!(id, "#models"),
        other => panic!("expected ElementNotFound, got: {other:?}"),
    }
    Ok(())
}

#[test]
fn identifiers_accept_selector_forms() -> Result<()> {
    let mut doc = Document::from_html(CARS_HTML)?;
    let mut cascade = CascadingSelector::new(&doc, "#make", "select#model", cars_table())?;
    cascade.start(&mut doc)?;

    doc.select_index("#make", 1)?;
    doc.assert_options("#model", &["Toyota"])?;

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn identifiers_are_looked_up_as_raw_ids_first() -> Result<()> {
    let html = r#"
        <select id='1make'>
          <option>German</option>
          <option>Japanese</option>
        </select>
        <select id='f[0]'></select>
        "#;
    let mut doc = Document::from_html(html)?;
    let mut cascade = CascadingSelector::new(&doc, "1make", "f[0]", cars_table())?;
    cascade.start(&mut doc)?;

    doc.select_index("#1make", 1)?;
    doc.assert_options("#f[0]", &["Toyota"])?;

    match CascadingSelector::new(&doc, "1make", "missing id", cars_table()) {
        Err(Error::ElementNotFound(id)) => assert_eq!(id, "#missing id"),
        other => panic!("expected ElementNotFound, got: {other:?}"),
    }

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn rendered_field_with_digit_leading_id_binds() -> Result<()> {
    let field = DoubleDropField::parse("one(),two(A,B)");
    let mut doc = Document::from_html(&field.render("q", None, "1q"))?;
    let mut cascade = field.bind(&doc, "1q")?;
    cascade.start(&mut doc)?;

    doc.set_select_value("#1q_0", "two")?;
    doc.assert_options("#1q_1", &["A", "B"])?;

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn non_select_controls_are_rejected() -> Result<()> {
    let html = r#"
        <input id='make' value='German'>
        <select id='model'></select>
        "#;
    let doc = Document::from_html(html)?;

    match CascadingSelector::new(&doc, "make", "model", cars_table()) {
        Err(Error::TypeMismatch {
            selector,
            expected,
            actual,
        }) => {
            assert_eq!(selector, "make");
            assert_eq!(expected, "select");
            assert_eq!(actual, "input");
        }
        other => panic!("expected TypeMismatch, got: {other:?}"),
    }
    Ok(())
}

#[test]
fn table_length_must_match_primary_choices() -> Result<()> {
    let doc = Document::from_html(CARS_HTML)?;
    let table = OptionTable::new(vec![vec!["Ford"]]);

    match CascadingSelector::new(&doc, "make", "model", table) {
        Err(Error::OptionTableMismatch {
            selector,
            groups,
            choices,
        }) => {
            assert_eq!(selector, "make");
            assert_eq!(groups, 1);
            assert_eq!(choices, 2);
        }
        other => panic!("expected OptionTableMismatch, got: {other:?}"),
    }
    Ok(())
}

#[test]
fn index_without_group_clears_secondary_instead_of_failing() -> Result<()> {
    let (mut doc, mut cascade) = started_cars()?;
    doc.select_index("#make", 0)?;
    doc.assert_options("#model", &["Ford", "BMW"])?;

    doc.control("#make")?.append("French", "French")?;
    doc.select_index("#make", 2)?;
    doc.assert_options("#model", &[])?;
    doc.assert_value("#make", "French")?;

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn refresh_follows_preselected_primary() -> Result<()> {
    let html = r#"
        <select id='make'>
          <option>German</option>
          <option selected>Japanese</option>
        </select>
        <select id='model'></select>
        "#;
    let mut doc = Document::from_html(html)?;
    let cascade = CascadingSelector::new(&doc, "make", "model", cars_table())?;

    assert!(!cascade.is_started());
    let outcome = cascade.refresh(&mut doc)?;
    assert_eq!(outcome, Repopulated::Group { index: 1, len: 1 });
    doc.assert_options("#model", &["Toyota"])?;
    Ok(())
}

#[test]
fn refresh_with_empty_primary_reports_no_selection() -> Result<()> {
    let html = "<select id='main'></select><select id='sub'><option>x</option></select>";
    let mut doc = Document::from_html(html)?;
    let cascade = CascadingSelector::new(&doc, "main", "sub", OptionTable::default())?;

    assert_eq!(cascade.refresh(&mut doc)?, Repopulated::NoSelection);
    doc.assert_options("#sub", &[])?;
    Ok(())
}

#[test]
fn primary_changes_through_value_assignment_also_cascade() -> Result<()> {
    let (mut doc, mut cascade) = started_cars()?;

    doc.set_select_value("#make", "Japanese")?;
    doc.assert_options("#model", &["Toyota"])?;
    assert_eq!(cascade.option_table(), &cars_table());

    cascade.dispose(&mut doc);
    Ok(())
}

#[test]
fn other_change_listeners_keep_running_alongside_the_cascade() -> Result<()> {
    let (mut doc, mut cascade) = started_cars()?;
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let listener = doc.add_event_listener("#make", "change", move |document, _event| {
        sink.borrow_mut().push(document.option_values("#model")?);
        Ok(())
    })?;

    doc.select_index("#make", 1)?;
    doc.select_index("#make", 0)?;
    assert_eq!(
        *seen.borrow(),
        vec![
            vec!["Toyota".to_string()],
            vec!["Ford".to_string(), "BMW".to_string()],
        ]
    );

    assert!(doc.remove_event_listener(listener));
    cascade.dispose(&mut doc);
    Ok(())
}
