#[macro_use]
mod common;

#[cfg(test)]
mod r#while {
    tests! {
        count in while is OK
        "0"
        "1"
        "2"
    }

    tests! {
        false_condition in while is OK
        "done"
    }

    tests! {
        return_inside in while is OK
        "done"
    }

    tests! {
        condition_must_close in while is ERR
        "[line 1] Error at 'print': Expect ')' after condition."
    }
}
