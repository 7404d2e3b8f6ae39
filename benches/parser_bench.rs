use criterion::{black_box, criterion_group, criterion_main, Criterion};
use intent_parser::{parse, tokenize};

const SIMPLE: &str = r#"
func add(a: Int, b: Int): Int {
  return a + b
}

func factorial(n: Int): Int requires n >= 0 {
  if (n <= 1) { return 1 }
  return n * factorial(n - 1)
}
"#;

const COMPLEX: &str = r#"
intent "Order processing" tags ["orders", "billing"]

uses {
  http: HttpClient { baseUrl: "https://shop.example.com", timeout: 30 },
  db: Database { pool: 8 },
  clock: Clock,
}

types {
  type OrderId = String brand "OrderId";
  type Quantity = Int brand "Quantity" where value > 0;
  type Status = "pending" | "paid" | "shipped" | "cancelled";
  type Line = { sku: String, quantity: Quantity, price: Float where value >= 0 };
  type Order = { id: OrderId, lines: Line[], status: Status };
  type Event = Placed { order: Order } | Paid { id: OrderId, amount: Float } | Cancelled { id: OrderId, reason: String };
}

func total(order: Order): Float ensures result >= 0 {
  let sum = 0.0
  for (line in order.lines) {
    sum += line.price * line.quantity
  }
  return sum
}

func label(s: Status): String {
  return match (s) {
    case "pending" => "Pending"
    case "paid" => "Paid"
    case "shipped" => "Shipped"
    case "cancelled" => "Cancelled"
  }
}

effect record(e: Event): Result<Unit, String> uses db, clock {
  match (e) {
    case Placed { order } => { db.insert(order.id, clock.now()) }
    case Paid { id, amount } if amount > 0 => { db.update(id, "paid") }
    case Paid { id } => { return Err("empty payment") }
    case Cancelled { id, reason: why } => { db.update(id, why) }
  }
  return Ok(db.commit())
}

test "label covers every status" {
  assertEq(label("paid"), "Paid")
  assertEq(label("cancelled"), "Cancelled")
}
"#;

fn benchmark_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_complex", |b| {
        b.iter(|| tokenize(black_box(COMPLEX)))
    });
}

fn benchmark_parse_simple(c: &mut Criterion) {
    c.bench_function("parse_simple", |b| {
        b.iter(|| parse(black_box(SIMPLE)))
    });
}

fn benchmark_parse_complex(c: &mut Criterion) {
    c.bench_function("parse_complex", |b| {
        b.iter(|| parse(black_box(COMPLEX)))
    });
}

criterion_group!(benches, benchmark_tokenize, benchmark_parse_simple, benchmark_parse_complex);
criterion_main!(benches);
