use crate::object::{Builtin, Object};

fn wrong_arity(got: usize, want: usize) -> Object {
    Object::Error(format!("wrong number of arguments. got={}, want={}", got, want))
}

fn expect_array<'v>(name: &str, value: &'v Object) -> Result<&'v [Object], Object> {
    match value {
        Object::Array(elements) => Ok(elements.as_slice()),
        other => Err(Object::Error(format!("argument to `{}` must be ARRAY, got {}", name, other.object_type()))),
    }
}

fn builtin_len(values: Vec<Object>) -> Object {
    if values.len() != 1 { return wrong_arity(values.len(), 1); }

    match &values[0] {
        Object::String(value) => Object::Integer(value.len() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => Object::Error(format!("argument to `len` not supported, got {}", other.object_type())),
    }
}

fn builtin_first(values: Vec<Object>) -> Object {
    if values.len() != 1 { return wrong_arity(values.len(), 1); }

    match expect_array("first", &values[0]) {
        Ok(elements) => elements.first().cloned().unwrap_or(Object::Null),
        Err(error) => error,
    }
}

fn builtin_last(values: Vec<Object>) -> Object {
    if values.len() != 1 { return wrong_arity(values.len(), 1); }

    match expect_array("last", &values[0]) {
        Ok(elements) => elements.last().cloned().unwrap_or(Object::Null),
        Err(error) => error,
    }
}

fn builtin_rest(values: Vec<Object>) -> Object {
    if values.len() != 1 { return wrong_arity(values.len(), 1); }

    match expect_array("rest", &values[0]) {
        Ok([]) => Object::Null,
        Ok([_, rest @ ..]) => Object::array(rest.to_vec()),
        Err(error) => error,
    }
}

fn builtin_push(values: Vec<Object>) -> Object {
    if values.len() != 2 { return wrong_arity(values.len(), 2); }

    match expect_array("push", &values[0]) {
        Ok(elements) => {
            let mut elements = elements.to_vec();
            elements.push(values[1].clone());
            Object::array(elements)
        }
        Err(error) => error,
    }
}

fn builtin_puts(values: Vec<Object>) -> Object {
    for value in values {
        println!("{}", value);
    }
    Object::Null
}

const BUILTINS: &[Builtin] = &[
    Builtin { name: "len", function: builtin_len },
    Builtin { name: "first", function: builtin_first },
    Builtin { name: "last", function: builtin_last },
    Builtin { name: "rest", function: builtin_rest },
    Builtin { name: "push", function: builtin_push },
    Builtin { name: "puts", function: builtin_puts },
];

/// Native function registered under `name`, if any. Consulted only after
/// the name failed to resolve in every environment frame.
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name).copied()
}
