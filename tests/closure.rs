#[macro_use]
mod common;

#[cfg(test)]
mod closure {
    tests! {
        snapshot in closure is OK
        "global"
        "global"
    }

    tests! {
        counter in closure is OK
        "1"
        "2"
    }

    tests! {
        close_over_parameter in closure is OK
        "param"
    }

    tests! {
        shared_environment in closure is OK
        "initial"
        "updated"
    }

    tests! {
        nested in closure is OK
        "a"
        "b"
        "c"
    }
}
