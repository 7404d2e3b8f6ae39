//! Parser tests for the Intent language

use intent_parser::{parse, ast::*, ParseError};

const SUBSCRIPTIONS: &str = r#"
intent "Manage subscriptions" tags ["billing", "users"]

uses {
  http: HttpClient { baseUrl: "https://api.example.com", timeout: 30, retry: true },
  clock: Clock,
}

types {
  type Status = "active" | "inactive";
  type UserId = String brand "UserId";
  type Age = Int brand "Age" where value >= 0;
  type User = { id: UserId, name: String, age: Int where value < 150 };
  type Event = Created { id: UserId } | Deleted { id: UserId, reason: String } | Ping;
  type Lookup = Result<User, String>;
  type Names = String[];
}

func isActive(s: Status): Bool requires s != "inactive" ensures result == true {
  return match (s) {
    case "active" => true
    case "inactive" => false
  }
}

func describe(e: Event): String {
  match (e) {
    case Created { id } => { return "created" }
    case Deleted { id, reason: why } => { return why }
    case Ping => { return "ping" }
  }
}

effect fetchUser(id: UserId): Result<User, String> uses http {
  let response = http.get("/users/" + id)
  if (response.status == 200) {
    return Ok(response.body)
  } else {
    return Err("not found")
  }
}

test "active users" {
  assert(isActive("active"));
  assertEq(describe(Ping), "ping")
}
"#;

fn parse_string(input: &str) -> Program {
    parse(input).expect("Parsing should succeed")
}

#[test]
fn test_full_program_structure() {
    let program = parse_string(SUBSCRIPTIONS);

    let intent = program.intent.as_ref().unwrap();
    assert_eq!(intent.description, "Manage subscriptions");
    assert_eq!(intent.tags, vec!["billing", "users"]);

    assert_eq!(program.capabilities().len(), 2);
    assert_eq!(program.type_decls().len(), 7);
    assert_eq!(program.funcs().count(), 2);
    assert_eq!(program.effects().count(), 1);
    assert_eq!(program.tests().count(), 1);

    let names: Vec<&str> = program.type_decls().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Status", "UserId", "Age", "User", "Event", "Lookup", "Names"]
    );
}

#[test]
fn test_type_declarations_have_expected_shapes() {
    let program = parse_string(SUBSCRIPTIONS);
    let decls = program.type_decls();

    assert!(matches!(&decls[0].ty, TypeExpr::Union(u) if u.has_literal_ctors() && !u.has_named_ctors()));
    assert!(matches!(&decls[1].ty, TypeExpr::Brand(b) if b.brand == "UserId" && b.refinement.is_none()));
    assert!(matches!(&decls[2].ty, TypeExpr::Brand(b) if b.refinement.is_some()));

    match &decls[3].ty {
        TypeExpr::Record(record) => {
            assert_eq!(record.fields.len(), 3);
            assert!(matches!(&record.fields[0].ty, TypeExpr::Generic(g) if g.name.name == "UserId" && g.args.is_empty()));
            assert!(record.fields[2].refinement.is_some());
        }
        other => panic!("expected record, got {:?}", other),
    }

    match &decls[4].ty {
        TypeExpr::Union(union) => {
            let keys: Vec<String> = union.ctors.iter().map(|c| c.key()).collect();
            assert_eq!(keys, vec!["Created", "Deleted", "Ping"]);
        }
        other => panic!("expected union, got {:?}", other),
    }

    assert!(matches!(&decls[5].ty, TypeExpr::Generic(g) if g.name.name == "Result" && g.args.len() == 2));
    assert!(matches!(&decls[6].ty, TypeExpr::Generic(g) if g.name.name == "List"));
}

#[test]
fn test_contracts_and_match_expression() {
    let program = parse_string(SUBSCRIPTIONS);
    let func = program.funcs().next().unwrap();

    assert_eq!(func.name.name, "isActive");
    assert!(matches!(
        func.contract.requires,
        Some(Expr::Binary { op: BinaryOp::NotEq, .. })
    ));
    assert!(matches!(
        func.contract.ensures,
        Some(Expr::Binary { op: BinaryOp::Eq, .. })
    ));

    match &func.body.stmts[0] {
        Stmt::Return(ReturnStmt { value: Some(Expr::Match(m)), .. }) => {
            assert_eq!(m.cases.len(), 2);
            assert!(matches!(
                &m.cases[0].pattern,
                Pattern::Literal { value: Literal::String(s), .. } if s == "active"
            ));
        }
        other => panic!("expected return of match, got {:?}", other),
    }
}

#[test]
fn test_match_statement_with_bindings() {
    let program = parse_string(SUBSCRIPTIONS);
    let describe = program.funcs().nth(1).unwrap();

    match &describe.body.stmts[0] {
        Stmt::Match(m) => {
            assert_eq!(m.cases.len(), 3);
            match &m.cases[1].pattern {
                Pattern::Variant { tag, bindings: Some(bindings), .. } => {
                    assert_eq!(tag.name, "Deleted");
                    assert_eq!(bindings[1].binding().name, "why");
                }
                other => panic!("expected variant pattern, got {:?}", other),
            }
            assert!(m.cases.iter().all(|c| matches!(c.body, CaseBody::Block(_))));
        }
        other => panic!("expected match statement, got {:?}", other),
    }
}

#[test]
fn test_spans_point_into_source() {
    let program = parse_string(SUBSCRIPTIONS);
    let effect = program.effects().next().unwrap();

    assert_eq!(effect.name.span.text(SUBSCRIPTIONS), Some("fetchUser"));
    assert_eq!(effect.uses[0].span.text(SUBSCRIPTIONS), Some("http"));
    assert!(effect.span.text(SUBSCRIPTIONS).unwrap().starts_with("effect fetchUser"));
    assert!(effect.span.text(SUBSCRIPTIONS).unwrap().ends_with('}'));
}

#[test]
fn test_round_trip_parses_are_identical() {
    let first = parse_string(SUBSCRIPTIONS);
    let _unrelated = parse_string("func other(): Int { return 1 }");
    let second = parse_string(SUBSCRIPTIONS);
    assert_eq!(first, second);
}

#[test]
fn test_ast_serializes_to_json() {
    let program = parse_string(SUBSCRIPTIONS);
    let json = serde_json::to_string(&program).unwrap();
    let restored: Program = serde_json::from_str(&json).unwrap();
    assert_eq!(program, restored);
}

#[test]
fn test_parse_errors_are_structured() {
    let cases = [
        ("func f( { }", "parameter name"),
        ("effect e() uses { }", "capability name"),
        ("types { type = Int }", "type name"),
        ("test 42 { }", "test name"),
    ];

    for (source, expected) in cases {
        match parse(source) {
            Err(ParseError::UnexpectedToken { expected: e, .. }) => assert_eq!(e, expected, "source: {}", source),
            other => panic!("expected unexpected-token error for {:?}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_compound_refinement_aborts_parse() {
    let err = parse(r#"types { type Age = Int brand "Age" where value >= 0 && value < 150; }"#).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    assert_eq!(err.message(), "compound refinement predicates are not supported");
}

#[test]
fn test_block_body_in_expression_match_aborts_parse() {
    let err = parse("func f(x: Int): Int { let y = match (x) { case 1 => { return 2 } case _ => 0 } }")
        .unwrap_err();
    assert_eq!(err.message(), "block bodies are not allowed in match expressions");
}

#[test]
fn test_unterminated_string_is_reported() {
    let err = parse("intent \"oops").unwrap_err();
    assert_eq!(err.message(), "unterminated string literal");
    assert_eq!(err.span().start.column, 8);
}

#[test]
fn test_test_name_may_be_identifier() {
    let program = parse_string("test smoke { assert(true) }");
    assert_eq!(program.tests().next().unwrap().name, "smoke");
}
