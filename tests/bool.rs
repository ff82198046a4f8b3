#[macro_use]
mod common;

#[cfg(test)]
mod bool {
    tests! {
        literals in bool is OK
        "true"
        "false"
    }

    tests! {
        equality in bool is OK
        "true"
        "false"
        "false"
    }

    tests! {
        not in bool is OK
        "false"
        "true"
    }
}
